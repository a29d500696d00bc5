#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;
pub mod yaml_files;

pub use toml_config::RunConfig;

use crate::domain::model::ScanResults;
use crate::domain::scan::Scan;
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIGURATION_FILE: &str = "configuration.yml";
pub const DEFAULT_CHECKS_FILE: &str = "checks.yml";
pub const DEFAULT_SODA_BIN: &str = "soda";
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// What has to hold after the scan for the run to count as successful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum AssertMode {
    #[default]
    None,
    NoErrorLogs,
    NoChecksFail,
    NoChecksWarnOrFail,
}

impl AssertMode {
    pub fn check(&self, results: &ScanResults) -> Result<()> {
        match self {
            AssertMode::None => Ok(()),
            AssertMode::NoErrorLogs => results.assert_no_error_logs(),
            AssertMode::NoChecksFail => results.assert_no_checks_fail(),
            AssertMode::NoChecksWarnOrFail => results.assert_no_checks_warn_or_fail(),
        }
    }
}

/// Settings for one run after the profile and the command line are merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    pub data_source: String,
    pub configuration_files: Vec<String>,
    pub checks_files: Vec<String>,
    pub variables: BTreeMap<String, String>,
    pub scan_definition: Option<String>,
    pub local: bool,
    pub verbose: bool,
    pub output_dir: String,
    pub output_file: Option<String>,
    pub save_csv: bool,
    pub assert: AssertMode,
    pub soda_bin: String,
    pub working_dir: Option<String>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            data_source: String::new(),
            configuration_files: vec![DEFAULT_CONFIGURATION_FILE.to_string()],
            checks_files: vec![DEFAULT_CHECKS_FILE.to_string()],
            variables: BTreeMap::new(),
            scan_definition: None,
            local: false,
            verbose: false,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            output_file: None,
            save_csv: false,
            assert: AssertMode::None,
            soda_bin: DEFAULT_SODA_BIN.to_string(),
            working_dir: None,
        }
    }
}

impl From<RunConfig> for RunSettings {
    fn from(profile: RunConfig) -> Self {
        let mut settings = RunSettings::default();
        let RunConfig {
            scan,
            output,
            engine,
        } = profile;

        if let Some(data_source) = scan.data_source {
            settings.data_source = data_source;
        }
        if !scan.configuration.is_empty() {
            settings.configuration_files = scan.configuration;
        }
        if !scan.checks.is_empty() {
            settings.checks_files = scan.checks;
        }
        settings.variables = scan.variables;
        settings.scan_definition = scan.scan_definition;
        settings.local = scan.local.unwrap_or(settings.local);
        settings.verbose = scan.verbose.unwrap_or(settings.verbose);

        if let Some(dir) = output.dir {
            settings.output_dir = dir;
        }
        settings.output_file = output.json;
        settings.save_csv = output.csv.unwrap_or(false);
        settings.assert = output.assert.unwrap_or_default();

        if let Some(soda_bin) = engine.soda_bin {
            settings.soda_bin = soda_bin;
        }
        settings.working_dir = engine.working_dir;

        settings
    }
}

impl RunSettings {
    /// Relative input files are looked up in the engine's working
    /// directory, the same place the engine itself reads them from.
    pub fn resolve_input(&self, path: &str) -> PathBuf {
        match &self.working_dir {
            Some(dir) if Path::new(path).is_relative() => Path::new(dir).join(path),
            _ => PathBuf::from(path),
        }
    }

    pub fn build_scan(&self) -> Scan {
        let mut scan = Scan::new();
        scan.set_data_source_name(self.data_source.clone());
        for configuration in &self.configuration_files {
            scan.add_configuration_yaml_file(self.resolve_input(configuration));
        }
        if !self.variables.is_empty() {
            scan.add_variables(self.variables.clone());
        }
        for checks in &self.checks_files {
            scan.add_sodacl_yaml_file(self.resolve_input(checks));
        }
        if let Some(name) = &self.scan_definition {
            scan.set_scan_definition_name(name.clone());
        }
        scan.set_is_local(self.local).set_verbose(self.verbose);
        scan
    }
}

impl Validate for RunSettings {
    fn validate(&self) -> Result<()> {
        if self.data_source.trim().is_empty() {
            return Err(ScanError::MissingConfigError {
                field: "data_source".to_string(),
            });
        }
        validate_path("output_dir", &self.output_dir)?;
        validate_non_empty_string("soda_bin", &self.soda_bin)?;

        if let Some(output_file) = &self.output_file {
            validate_path("output", output_file)?;
        } else if self.save_csv {
            return Err(ScanError::ConfigError {
                message: "CSV export needs a JSON output file (--output)".to_string(),
            });
        }

        for key in self.variables.keys() {
            validate_non_empty_string("variables", key)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_the_conventional_file_names() {
        let settings = RunSettings::default();
        assert_eq!(settings.configuration_files, vec!["configuration.yml"]);
        assert_eq!(settings.checks_files, vec!["checks.yml"]);
        assert_eq!(settings.soda_bin, "soda");
        assert_eq!(settings.assert, AssertMode::None);
        assert!(settings.output_file.is_none());
    }

    #[test]
    fn test_profile_overrides_defaults() {
        let profile = RunConfig::from_toml_str(
            r#"
[scan]
data_source = "db_ca_kerry"
checks = ["orders.yml"]
verbose = true

[output]
json = "output.json"
csv = true
"#,
        )
        .unwrap();

        let settings = RunSettings::from(profile);
        assert_eq!(settings.data_source, "db_ca_kerry");
        assert_eq!(settings.configuration_files, vec!["configuration.yml"]);
        assert_eq!(settings.checks_files, vec!["orders.yml"]);
        assert!(settings.verbose);
        assert!(!settings.local);
        assert_eq!(settings.output_file.as_deref(), Some("output.json"));
        assert!(settings.save_csv);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_data_source() {
        let settings = RunSettings::default();
        assert!(matches!(
            settings.validate(),
            Err(ScanError::MissingConfigError { field }) if field == "data_source"
        ));
    }

    #[test]
    fn test_csv_needs_json_output() {
        let settings = RunSettings {
            data_source: "db_ca_kerry".to_string(),
            save_csv: true,
            ..RunSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ScanError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_build_scan_carries_settings() {
        let mut settings = RunSettings {
            data_source: "db_ca_kerry".to_string(),
            local: true,
            ..RunSettings::default()
        };
        settings
            .variables
            .insert("date".to_string(), "2024-01-28".to_string());

        let scan = settings.build_scan();
        let request = scan.build_request().unwrap();
        assert_eq!(request.data_source, "db_ca_kerry");
        assert_eq!(request.scan_definition, "db_ca_kerry_dq_checks");
        assert_eq!(request.checks_files.len(), 1);
        assert!(request.local);
        assert_eq!(request.variables.len(), 1);
    }

    #[test]
    fn test_relative_inputs_follow_working_dir() {
        let settings = RunSettings {
            data_source: "db_ca_kerry".to_string(),
            checks_files: vec!["checks.yml".to_string(), "/etc/dq/shared.yml".to_string()],
            working_dir: Some("/proj".to_string()),
            ..RunSettings::default()
        };

        let request = settings.build_scan().build_request().unwrap();
        assert_eq!(
            request.configuration_files,
            vec![PathBuf::from("/proj/configuration.yml")]
        );
        assert_eq!(
            request.checks_files,
            vec![
                PathBuf::from("/proj/checks.yml"),
                PathBuf::from("/etc/dq/shared.yml")
            ]
        );

        let without_dir = RunSettings {
            working_dir: None,
            ..settings
        };
        assert_eq!(
            without_dir.resolve_input("checks.yml"),
            PathBuf::from("checks.yml")
        );
    }

    #[test]
    fn test_assert_modes() {
        let results: ScanResults = serde_json::from_value(serde_json::json!({
            "checks": [
                {"name": "row_count > 0", "outcome": "warn"}
            ]
        }))
        .unwrap();

        assert!(AssertMode::None.check(&results).is_ok());
        assert!(AssertMode::NoErrorLogs.check(&results).is_ok());
        assert!(AssertMode::NoChecksFail.check(&results).is_ok());
        assert!(AssertMode::NoChecksWarnOrFail.check(&results).is_err());
    }
}
