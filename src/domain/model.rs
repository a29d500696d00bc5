use crate::utils::error::{Result, ScanError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Everything the engine needs to run one scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanRequest {
    pub data_source: String,
    pub configuration_files: Vec<PathBuf>,
    pub checks_files: Vec<PathBuf>,
    pub variables: BTreeMap<String, String>,
    pub scan_definition: String,
    pub local: bool,
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub exit_code: ScanExitCode,
    /// The results document exactly as the engine produced it.
    pub raw: Value,
    pub results: ScanResults,
}

impl ScanOutcome {
    pub fn from_raw(exit_code: ScanExitCode, raw: Value) -> Result<Self> {
        let results = serde_json::from_value(raw.clone())?;
        Ok(Self {
            exit_code,
            raw,
            results,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanExitCode {
    /// All checks passed.
    Success,
    /// At least one check warned.
    Warnings,
    /// At least one check failed.
    Failures,
    /// Runtime error, results were still submitted.
    Error,
    /// Runtime error and no results could be submitted.
    ErrorNoResults,
    Other(i32),
}

impl ScanExitCode {
    pub fn code(&self) -> i32 {
        match self {
            ScanExitCode::Success => 0,
            ScanExitCode::Warnings => 1,
            ScanExitCode::Failures => 2,
            ScanExitCode::Error => 3,
            ScanExitCode::ErrorNoResults => 4,
            ScanExitCode::Other(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScanExitCode::Success)
    }
}

impl From<i32> for ScanExitCode {
    fn from(code: i32) -> Self {
        match code {
            0 => ScanExitCode::Success,
            1 => ScanExitCode::Warnings,
            2 => ScanExitCode::Failures,
            3 => ScanExitCode::Error,
            4 => ScanExitCode::ErrorNoResults,
            other => ScanExitCode::Other(other),
        }
    }
}

impl fmt::Display for ScanExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckOutcome {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheckOutcome::Pass => "PASS",
            CheckOutcome::Warn => "WARN",
            CheckOutcome::Fail => "FAIL",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" | "CRITICAL" => Ok(LogLevel::Error),
            other => Err(serde::de::Error::custom(format!(
                "unknown log level: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<7}| {}", self.level.as_str(), self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    /// `None` when the engine could not evaluate the check.
    #[serde(default)]
    pub outcome: Option<CheckOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CheckResult {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.definition.as_deref())
            .or(self.identity.as_deref())
            .unwrap_or("<unnamed check>")
    }

    pub fn is_fail(&self) -> bool {
        self.outcome == Some(CheckOutcome::Fail)
    }

    pub fn is_warn_or_fail(&self) -> bool {
        matches!(self.outcome, Some(CheckOutcome::Warn | CheckOutcome::Fail))
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())?;
        if let Some(table) = &self.table {
            write!(f, " [{}]", table)?;
        }
        match self.outcome {
            Some(outcome) => write!(f, " {}", outcome),
            None => write!(f, " NOT EVALUATED"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub total: usize,
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
    pub not_evaluated: usize,
}

impl fmt::Display for CheckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} checks: {} passed, {} warned, {} failed, {} not evaluated",
            self.total, self.pass, self.warn, self.fail, self.not_evaluated
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_data_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_start_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_end_timestamp: Option<String>,
    #[serde(default)]
    pub has_errors: bool,
    #[serde(default)]
    pub has_warnings: bool,
    #[serde(default)]
    pub has_failures: bool,
    #[serde(default)]
    pub metrics: Vec<Value>,
    #[serde(default)]
    pub checks: Vec<CheckResult>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScanResults {
    pub fn logs_text(&self) -> String {
        self.logs
            .iter()
            .map(|log| log.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn error_logs(&self) -> Vec<&LogEntry> {
        self.logs
            .iter()
            .filter(|log| log.level == LogLevel::Error)
            .collect()
    }

    pub fn has_error_logs(&self) -> bool {
        self.logs.iter().any(|log| log.level == LogLevel::Error)
    }

    pub fn error_logs_text(&self) -> Option<String> {
        let errors = self.error_logs();
        if errors.is_empty() {
            return None;
        }
        let lines = errors
            .iter()
            .map(|log| format!("  {}", log))
            .collect::<Vec<_>>()
            .join("\n");
        Some(format!("{} error logs:\n{}", errors.len(), lines))
    }

    pub fn assert_no_error_logs(&self) -> Result<()> {
        match self.error_logs_text() {
            Some(message) => Err(ScanError::AssertionFailed { message }),
            None => Ok(()),
        }
    }

    pub fn checks_fail(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|check| check.is_fail()).collect()
    }

    pub fn has_check_fails(&self) -> bool {
        self.checks.iter().any(CheckResult::is_fail)
    }

    pub fn checks_fail_text(&self) -> Option<String> {
        checks_text(&self.checks_fail(), "failed")
    }

    pub fn assert_no_checks_fail(&self) -> Result<()> {
        match self.checks_fail_text() {
            Some(message) => Err(ScanError::AssertionFailed { message }),
            None => Ok(()),
        }
    }

    pub fn checks_warn_or_fail(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|check| check.is_warn_or_fail())
            .collect()
    }

    pub fn has_checks_warn_or_fail(&self) -> bool {
        self.checks.iter().any(CheckResult::is_warn_or_fail)
    }

    pub fn checks_warn_or_fail_text(&self) -> Option<String> {
        checks_text(&self.checks_warn_or_fail(), "warned or failed")
    }

    pub fn assert_no_checks_warn_or_fail(&self) -> Result<()> {
        match self.checks_warn_or_fail_text() {
            Some(message) => Err(ScanError::AssertionFailed { message }),
            None => Ok(()),
        }
    }

    pub fn all_checks_text(&self) -> Option<String> {
        let all: Vec<&CheckResult> = self.checks.iter().collect();
        checks_text(&all, "evaluated")
    }

    pub fn summary(&self) -> CheckSummary {
        let mut summary = CheckSummary {
            total: self.checks.len(),
            ..CheckSummary::default()
        };
        for check in &self.checks {
            match check.outcome {
                Some(CheckOutcome::Pass) => summary.pass += 1,
                Some(CheckOutcome::Warn) => summary.warn += 1,
                Some(CheckOutcome::Fail) => summary.fail += 1,
                None => summary.not_evaluated += 1,
            }
        }
        summary
    }
}

fn checks_text(checks: &[&CheckResult], verb: &str) -> Option<String> {
    if checks.is_empty() {
        return None;
    }
    let lines = checks
        .iter()
        .map(|check| format!("  {}", check))
        .collect::<Vec<_>>()
        .join("\n");
    Some(format!("{} checks {}:\n{}", checks.len(), verb, lines))
}
