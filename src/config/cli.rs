use crate::config::{AssertMode, RunConfig, RunSettings};
use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "dq-scan")]
#[command(about = "Run Soda Core data-quality checks against BigQuery and export the results")]
pub struct CliConfig {
    /// TOML run profile; command line flags take precedence over it
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Data source to scan, as named in the configuration file
    #[arg(short = 'd', long)]
    pub data_source: Option<String>,

    /// Configuration YAML file(s) [default: configuration.yml]
    #[arg(short = 'c', long, value_delimiter = ',')]
    pub configuration: Vec<String>,

    /// Checks YAML file(s) [default: checks.yml]
    #[arg(long, value_delimiter = ',')]
    pub checks: Vec<String>,

    /// Scan variable as key=value, e.g. date=2024-01-28
    #[arg(short = 'v', long = "var", value_parser = parse_key_val)]
    pub variables: Vec<(String, String)>,

    /// Scan definition name [default: <data source>_dq_checks]
    #[arg(short = 's', long)]
    pub scan_definition: Option<String>,

    /// Do not send results to Soda Cloud
    #[arg(short = 'l', long)]
    pub local: bool,

    /// Verbose engine logs and debug output
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Save the scan results as JSON to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Also save the metrics of the results as CSV next to the JSON file
    #[arg(long)]
    pub csv: bool,

    /// Directory that relative output files are written to
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Path of the soda executable
    #[arg(long)]
    pub soda_bin: Option<String>,

    /// Fail the run when the results violate this condition
    #[arg(long, value_enum)]
    pub assert: Option<AssertMode>,

    /// Exit with the scan's own exit code
    #[arg(long)]
    pub propagate_exit_code: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Show the resolved settings and the engine command without running it
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

impl CliConfig {
    /// Loads the profile (if any) and lays the command line on top.
    pub fn resolve(&self) -> Result<RunSettings> {
        let mut settings = match &self.profile {
            Some(path) => RunSettings::from(RunConfig::from_file(path)?),
            None => RunSettings::default(),
        };
        self.apply_to(&mut settings);
        Ok(settings)
    }

    pub fn apply_to(&self, settings: &mut RunSettings) {
        if let Some(data_source) = &self.data_source {
            settings.data_source = data_source.clone();
        }
        if !self.configuration.is_empty() {
            settings.configuration_files = self.configuration.clone();
        }
        if !self.checks.is_empty() {
            settings.checks_files = self.checks.clone();
        }
        settings.variables.extend(self.variables.iter().cloned());
        if let Some(name) = &self.scan_definition {
            settings.scan_definition = Some(name.clone());
        }
        settings.local |= self.local;
        settings.verbose |= self.verbose;
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(output) = &self.output {
            settings.output_file = Some(output.clone());
        }
        settings.save_csv |= self.csv;
        if let Some(assert) = self.assert {
            settings.assert = assert;
        }
        if let Some(soda_bin) = &self.soda_bin {
            settings.soda_bin = soda_bin.clone();
        }
    }
}
