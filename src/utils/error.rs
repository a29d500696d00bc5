use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration file '{path}' could not be parsed: {message}")]
    ConfigParseError { path: String, message: String },

    #[error("Scan engine '{binary}' not found: {message}")]
    EngineNotFound { binary: String, message: String },

    #[error("Scan engine failed: {message}")]
    EngineError { message: String },

    #[error("Scan has not been executed yet")]
    ScanNotExecuted,

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Assertion failed: {message}")]
    AssertionFailed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Engine,
    Io,
    Data,
    Assertion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ScanError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScanError::ConfigError { .. }
            | ScanError::InvalidConfigValueError { .. }
            | ScanError::MissingConfigError { .. }
            | ScanError::ConfigParseError { .. }
            | ScanError::YamlError(_) => ErrorCategory::Configuration,
            ScanError::EngineNotFound { .. }
            | ScanError::EngineError { .. }
            | ScanError::ScanNotExecuted => ErrorCategory::Engine,
            ScanError::IoError(_) => ErrorCategory::Io,
            ScanError::SerializationError(_)
            | ScanError::CsvError(_)
            | ScanError::ProcessingError { .. } => ErrorCategory::Data,
            ScanError::AssertionFailed { .. } => ErrorCategory::Assertion,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Assertion => ErrorSeverity::High,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::High,
            ErrorCategory::Engine => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScanError::EngineNotFound { .. } => {
                "Install Soda Core (pip install soda-core-bigquery) or pass --soda-bin"
            }
            ScanError::EngineError { .. } => {
                "Run again with --verbose and inspect the engine output above"
            }
            ScanError::ConfigParseError { .. } | ScanError::YamlError(_) => {
                "Check the YAML/TOML syntax of the configuration files"
            }
            ScanError::MissingConfigError { .. } | ScanError::InvalidConfigValueError { .. } => {
                "Check the command line flags and the run profile"
            }
            ScanError::ConfigError { .. } => "Check the configuration and checks file paths",
            ScanError::ScanNotExecuted => "Execute the scan before reading its results",
            ScanError::IoError(_) => "Check that the paths exist and are writable",
            ScanError::SerializationError(_)
            | ScanError::CsvError(_)
            | ScanError::ProcessingError { .. } => {
                "Check that the results file is a complete scan results document"
            }
            ScanError::AssertionFailed { .. } => "Review the failing checks listed above",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScanError::EngineNotFound { binary, .. } => {
                format!("Could not start the scan engine '{}'", binary)
            }
            ScanError::AssertionFailed { message } => message.clone(),
            ScanError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
