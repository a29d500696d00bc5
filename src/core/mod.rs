pub mod export;
pub mod runner;

pub use crate::domain::model::{ScanOutcome, ScanRequest, ScanResults};
pub use crate::domain::ports::{ScanEngine, Storage};
pub use crate::utils::error::Result;
