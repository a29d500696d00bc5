use crate::utils::error::{Result, ScanError};
use regex::{Captures, Regex};
use std::path::Path;
use std::sync::OnceLock;

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}").expect("valid regex"))
}

/// Replaces `${VAR}` with the value of the environment variable. Unset
/// variables are left untouched so the engine can report them itself.
pub fn substitute_env_vars(content: &str) -> String {
    substitute_vars_with(content, |name| std::env::var(name).ok())
}

/// [`substitute_env_vars`] with the variable lookup supplied by the caller.
pub fn substitute_vars_with<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    env_var_pattern()
        .replace_all(content, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

pub fn parse_yaml_str(path: &str, content: &str) -> Result<serde_yaml::Value> {
    parse_substituted(path, &substitute_env_vars(content))
}

fn parse_substituted(path: &str, processed: &str) -> Result<serde_yaml::Value> {
    serde_yaml::from_str(processed).map_err(|e| ScanError::ConfigParseError {
        path: path.to_string(),
        message: e.to_string(),
    })
}

pub fn load_yaml_file<P: AsRef<Path>>(path: P) -> Result<serde_yaml::Value> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ScanError::ConfigError {
        message: format!("Cannot read '{}': {}", path.display(), e),
    })?;
    parse_yaml_str(&path.display().to_string(), &content)
}

/// Names declared as `data_source <name>:` at the top level of a
/// configuration document.
pub fn data_source_names(document: &serde_yaml::Value) -> Vec<String> {
    let Some(mapping) = document.as_mapping() else {
        return Vec::new();
    };

    mapping
        .iter()
        .filter_map(|(key, _)| key.as_str())
        .filter_map(|key| key.strip_prefix("data_source "))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
