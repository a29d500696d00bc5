use crate::config::RunSettings;
use crate::core::export::{save_to_csv, save_to_json};
use crate::core::{ScanEngine, Storage};
use crate::domain::model::{CheckSummary, ScanExitCode};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub exit_code: i32,
    pub summary: CheckSummary,
    pub json_path: Option<String>,
    pub csv_path: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn scan_exit_code(&self) -> ScanExitCode {
        ScanExitCode::from(self.exit_code)
    }

    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

/// Runs one scan end to end: execute, print, export, assert.
pub struct ScanRunner<E: ScanEngine, S: Storage> {
    engine: E,
    storage: S,
    settings: RunSettings,
}

impl<E: ScanEngine, S: Storage> ScanRunner<E, S> {
    pub fn new(engine: E, storage: S, settings: RunSettings) -> Self {
        Self {
            engine,
            storage,
            settings,
        }
    }

    pub async fn run(&self) -> Result<ScanReport> {
        let started_at = Utc::now();
        self.settings.validate()?;

        let mut scan = self.settings.build_scan();
        tracing::info!("Starting scan on data source '{}'", self.settings.data_source);

        let exit_code = scan.execute(&self.engine).await?;
        println!("exit_code is {}", exit_code);
        tracing::info!("Scan finished with exit code {}", exit_code);

        let results = scan.scan_results()?;
        let summary = results.summary();

        let logs = results.logs_text();
        if !logs.is_empty() {
            println!("{}", logs);
        }
        if let Some(failed) = results.checks_fail_text() {
            println!("{}", failed);
        }
        tracing::info!("{}", summary);

        let mut json_path = None;
        let mut csv_path = None;
        if let Some(output_file) = &self.settings.output_file {
            save_to_json(&self.storage, output_file, scan.raw_scan_results()?).await?;
            tracing::info!("📁 Scan results saved to: {}", output_file);
            json_path = Some(output_file.clone());

            if self.settings.save_csv {
                let path = save_to_csv(&self.storage, output_file).await?;
                tracing::info!("📁 Metrics saved to: {}", path);
                csv_path = Some(path);
            }
        }

        self.settings.assert.check(results)?;

        Ok(ScanReport {
            exit_code: exit_code.code(),
            summary,
            json_path,
            csv_path,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
