pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{LocalStorage, SodaCliEngine};
pub use config::{AssertMode, RunConfig, RunSettings};
pub use core::runner::{ScanReport, ScanRunner};
pub use domain::model::{CheckOutcome, CheckResult, ScanExitCode, ScanResults};
pub use domain::scan::Scan;
pub use utils::error::{Result, ScanError};
