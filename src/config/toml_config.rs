use crate::config::yaml_files::{substitute_env_vars, substitute_vars_with};
use crate::config::AssertMode;
use crate::utils::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A saved run profile (`dq-scan.toml`). Every value can be overridden on
/// the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub engine: EngineSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSection {
    pub data_source: Option<String>,
    #[serde(default)]
    pub configuration: Vec<String>,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    pub scan_definition: Option<String>,
    pub local: Option<bool>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSection {
    pub dir: Option<String>,
    pub json: Option<String>,
    pub csv: Option<bool>,
    pub assert: Option<AssertMode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineSection {
    pub soda_bin: Option<String>,
    pub working_dir: Option<String>,
}

impl RunConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ScanError::ConfigError {
            message: format!("Cannot read run profile '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ScanError::ConfigParseError { message, .. } => ScanError::ConfigParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// 從 TOML 字串解析配置，${VAR} 以環境變數替換
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse(&substitute_env_vars(content))
    }

    /// 同上，但 ${VAR} 由 `lookup` 提供
    pub fn from_toml_str_with<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::parse(&substitute_vars_with(content, lookup))
    }

    fn parse(processed_content: &str) -> Result<Self> {
        toml::from_str(processed_content).map_err(|e| ScanError::ConfigParseError {
            path: "<toml>".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }
}
