use crate::config::yaml_files;
use crate::domain::model::{ScanExitCode, ScanOutcome, ScanRequest, ScanResults};
use crate::domain::ports::ScanEngine;
use crate::utils::error::{Result, ScanError};
use crate::utils::validation::{
    validate_file_extensions, validate_files_exist, validate_non_empty_list,
    validate_non_empty_string, validate_required_field, Validate,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// One data-quality scan: which data source, which configuration and checks
/// files, and the results once it has been executed.
#[derive(Debug, Default)]
pub struct Scan {
    data_source_name: Option<String>,
    configuration_files: Vec<PathBuf>,
    checks_files: Vec<PathBuf>,
    variables: BTreeMap<String, String>,
    scan_definition_name: Option<String>,
    is_local: bool,
    verbose: bool,
    outcome: Option<ScanOutcome>,
}

impl Scan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data_source_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.data_source_name = Some(name.into());
        self
    }

    pub fn add_configuration_yaml_file(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.configuration_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn add_variables<I, K, V>(&mut self, variables: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.variables
            .extend(variables.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn add_sodacl_yaml_file(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.checks_files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn set_scan_definition_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.scan_definition_name = Some(name.into());
        self
    }

    /// Keep results local instead of sending them to the cloud service.
    pub fn set_is_local(&mut self, local: bool) -> &mut Self {
        self.is_local = local;
        self
    }

    pub fn set_verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    pub fn data_source_name(&self) -> Option<&str> {
        self.data_source_name.as_deref()
    }

    /// Falls back to `<data source>_dq_checks` when no name was set.
    pub fn scan_definition_name(&self) -> Option<String> {
        self.scan_definition_name.clone().or_else(|| {
            self.data_source_name
                .as_ref()
                .map(|source| format!("{}_dq_checks", source))
        })
    }

    pub fn build_request(&self) -> Result<ScanRequest> {
        let data_source = validate_required_field("data_source", &self.data_source_name)?;
        validate_non_empty_string("data_source", data_source)?;

        Ok(ScanRequest {
            data_source: data_source.clone(),
            configuration_files: self.configuration_files.clone(),
            checks_files: self.checks_files.clone(),
            variables: self.variables.clone(),
            scan_definition: self
                .scan_definition_name()
                .unwrap_or_else(|| format!("{}_dq_checks", data_source)),
            local: self.is_local,
            verbose: self.verbose,
        })
    }

    pub async fn execute<E>(&mut self, engine: &E) -> Result<ScanExitCode>
    where
        E: ScanEngine + ?Sized,
    {
        self.validate()?;
        let request = self.build_request()?;

        tracing::info!(
            "Executing scan '{}' on data source '{}' with {}",
            request.scan_definition,
            request.data_source,
            engine.name()
        );
        tracing::debug!("Scan request: {:?}", request);

        let outcome = engine.execute(&request).await?;
        let exit_code = outcome.exit_code;
        self.outcome = Some(outcome);
        Ok(exit_code)
    }

    pub fn exit_code(&self) -> Option<ScanExitCode> {
        self.outcome.as_ref().map(|outcome| outcome.exit_code)
    }

    pub fn scan_results(&self) -> Result<&ScanResults> {
        self.outcome
            .as_ref()
            .map(|outcome| &outcome.results)
            .ok_or(ScanError::ScanNotExecuted)
    }

    /// The results document as the engine wrote it, fields this crate does
    /// not model included.
    pub fn raw_scan_results(&self) -> Result<&Value> {
        self.outcome
            .as_ref()
            .map(|outcome| &outcome.raw)
            .ok_or(ScanError::ScanNotExecuted)
    }

    pub fn logs_text(&self) -> Result<String> {
        Ok(self.scan_results()?.logs_text())
    }
}

fn path_strings(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| path.to_string_lossy().into_owned())
        .collect()
}

impl Validate for Scan {
    fn validate(&self) -> Result<()> {
        let data_source = validate_required_field("data_source", &self.data_source_name)?;
        validate_non_empty_string("data_source", data_source)?;

        let configuration = path_strings(&self.configuration_files);
        validate_non_empty_list("configuration", &configuration)?;
        validate_file_extensions("configuration", &configuration, YAML_EXTENSIONS)?;
        validate_files_exist("configuration", &configuration)?;

        let checks = path_strings(&self.checks_files);
        validate_non_empty_list("checks", &checks)?;
        validate_file_extensions("checks", &checks, YAML_EXTENSIONS)?;
        validate_files_exist("checks", &checks)?;

        let mut declared = Vec::new();
        for path in &self.configuration_files {
            let document = yaml_files::load_yaml_file(path)?;
            declared.extend(yaml_files::data_source_names(&document));
        }
        if !declared.is_empty() && !declared.iter().any(|name| name == data_source) {
            tracing::warn!(
                "Data source '{}' is not declared in the configuration files (found: {})",
                data_source,
                declared.join(", ")
            );
        }

        for path in &self.checks_files {
            yaml_files::load_yaml_file(path)?;
        }

        Ok(())
    }
}
