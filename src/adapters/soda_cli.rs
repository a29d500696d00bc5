use crate::domain::model::{ScanExitCode, ScanOutcome, ScanRequest};
use crate::domain::ports::ScanEngine;
use crate::utils::error::{Result, ScanError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const RESULTS_FILE_NAME: &str = "scan_results.json";

/// Runs scans through the `soda` command line tool.
#[derive(Debug, Clone)]
pub struct SodaCliEngine {
    binary: String,
    working_dir: Option<PathBuf>,
}

impl Default for SodaCliEngine {
    fn default() -> Self {
        Self::new("soda")
    }
}

impl SodaCliEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: None,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn build_args(request: &ScanRequest, results_file: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["scan".into(), "-d".into(), request.data_source.clone().into()];

        for configuration in &request.configuration_files {
            args.push("-c".into());
            args.push(configuration.clone().into_os_string());
        }

        for (key, value) in &request.variables {
            args.push("-v".into());
            args.push(format!("{}={}", key, value).into());
        }

        args.push("-s".into());
        args.push(request.scan_definition.clone().into());

        if request.local {
            args.push("-l".into());
        }
        if request.verbose {
            args.push("-V".into());
        }

        args.push("-srf".into());
        args.push(results_file.as_os_str().to_os_string());

        for checks in &request.checks_files {
            args.push(checks.clone().into_os_string());
        }

        args
    }

    /// Stand-in results for a run that ended before the engine wrote any,
    /// so the console still shows what went wrong.
    fn synthesize_results(request: &ScanRequest, stdout: &str, stderr: &str) -> Value {
        let detail = if !stderr.trim().is_empty() {
            stderr.trim()
        } else if !stdout.trim().is_empty() {
            stdout.trim()
        } else {
            "engine exited without writing scan results"
        };

        json!({
            "definitionName": request.scan_definition,
            "defaultDataSource": request.data_source,
            "hasErrors": true,
            "hasWarnings": false,
            "hasFailures": false,
            "metrics": [],
            "checks": [],
            "logs": [{
                "level": "ERROR",
                "message": detail,
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "index": 0
            }]
        })
    }
}

#[async_trait]
impl ScanEngine for SodaCliEngine {
    fn name(&self) -> &str {
        &self.binary
    }

    async fn execute(&self, request: &ScanRequest) -> Result<ScanOutcome> {
        let results_dir = tempfile::TempDir::new()?;
        let results_file = results_dir.path().join(RESULTS_FILE_NAME);
        let args = Self::build_args(request, &results_file);

        tracing::debug!("Running {} {:?}", self.binary, args);

        let mut command = Command::new(&self.binary);
        command.args(&args).kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScanError::EngineNotFound {
                    binary: self.binary.clone(),
                    message: e.to_string(),
                }
            } else {
                ScanError::EngineError {
                    message: format!("failed to run '{}': {}", self.binary, e),
                }
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            tracing::debug!(target: "dq_scan::engine", "{}", line);
        }

        let exit_code = match output.status.code() {
            Some(code) => ScanExitCode::from(code),
            None => {
                tracing::warn!("{} was terminated by a signal", self.binary);
                ScanExitCode::ErrorNoResults
            }
        };
        tracing::debug!("{} exited with {}", self.binary, exit_code);

        let raw = if results_file.is_file() {
            let content = tokio::fs::read(&results_file).await?;
            serde_json::from_slice(&content)?
        } else {
            tracing::warn!(
                "{} did not write a scan results file (exit code {})",
                self.binary,
                exit_code
            );
            Self::synthesize_results(request, &stdout, &stderr)
        };

        ScanOutcome::from_raw(exit_code, raw)
    }
}
