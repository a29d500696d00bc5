// Adapters layer: concrete implementations of the domain ports.

pub mod soda_cli;
pub mod storage;

pub use soda_cli::SodaCliEngine;
pub use storage::LocalStorage;
