#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const CONFIGURATION_YAML: &str = r#"
data_source db_ca_kerry:
  type: bigquery
  account_info_json_path: ./service_account.json
  auth_scopes:
    - https://www.googleapis.com/auth/bigquery
  project_id: kerry-analytics
  dataset: sales
"#;

pub const CHECKS_YAML: &str = r#"
checks for orders:
  - row_count > 0
  - missing_count(order_id) = 0
  - duplicate_count(order_id) = 0:
      name: Order ids are unique
"#;

pub const RESULTS_JSON: &str = r#"{
  "definitionName": "db_ca_kerry_dq_checks",
  "defaultDataSource": "db_ca_kerry",
  "dataTimestamp": "2024-01-28T00:00:00+00:00",
  "scanStartTimestamp": "2024-01-28T06:00:00+00:00",
  "scanEndTimestamp": "2024-01-28T06:00:12+00:00",
  "hasErrors": false,
  "hasWarnings": false,
  "hasFailures": true,
  "metrics": [
    {"identity": "metric-orders-row_count", "metricName": "row_count", "value": 1200, "dataSourceName": "db_ca_kerry"},
    {"identity": "metric-orders-order_id-missing_count", "metricName": "missing_count", "value": 4, "dataSourceName": "db_ca_kerry"},
    {"identity": "metric-orders-order_id-duplicate_count", "metricName": "duplicate_count", "value": 0, "dataSourceName": "db_ca_kerry"}
  ],
  "checks": [
    {"name": "row_count > 0", "table": "orders", "dataSource": "db_ca_kerry", "outcome": "pass"},
    {"name": "missing_count(order_id) = 0", "table": "orders", "column": "order_id", "dataSource": "db_ca_kerry", "outcome": "fail"},
    {"name": "Order ids are unique", "table": "orders", "column": "order_id", "dataSource": "db_ca_kerry", "outcome": "pass"}
  ],
  "queries": [],
  "logs": [
    {"level": "INFO", "message": "Soda Core 3.0.0", "timestamp": "2024-01-28T06:00:00+00:00", "index": 0},
    {"level": "INFO", "message": "Oops! 1 failures. 0 warnings. 0 errors. 2 pass.", "timestamp": "2024-01-28T06:00:12+00:00", "index": 1}
  ]
}"#;

/// Writes `configuration.yml` and `checks.yml` into `dir`.
pub fn write_scan_files(dir: &Path) -> (PathBuf, PathBuf) {
    let configuration = dir.join("configuration.yml");
    std::fs::write(&configuration, CONFIGURATION_YAML).unwrap();
    let checks = dir.join("checks.yml");
    std::fs::write(&checks, CHECKS_YAML).unwrap();
    (configuration, checks)
}

/// A stand-in `soda` executable. It records its arguments in `args.txt`
/// and its working directory in `cwd.txt` next to itself, writes `results`
/// to the `-srf` file when given, and exits with `exit_code`.
#[cfg(unix)]
pub fn write_fake_soda(dir: &Path, results: Option<&str>, exit_code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let results_step = match results {
        Some(json) => {
            let json_path = dir.join("fake_results.json");
            std::fs::write(&json_path, json).unwrap();
            format!("cp '{}' \"$out\"", json_path.display())
        }
        None => "echo 'Could not read service account file' >&2".to_string(),
    };

    let script = format!(
        r#"#!/bin/sh
printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
pwd -P > "$(dirname "$0")/cwd.txt"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "-srf" ]; then
    out="$2"
    shift
  fi
  shift
done
{results_step}
exit {exit_code}
"#
    );

    let path = dir.join("soda");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn recorded_args(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("args.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn recorded_cwd(dir: &Path) -> PathBuf {
    PathBuf::from(
        std::fs::read_to_string(dir.join("cwd.txt"))
            .unwrap()
            .trim_end(),
    )
}
