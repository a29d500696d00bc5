use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod common;

#[test]
fn test_help_lists_scan_options() {
    Command::cargo_bin("dq-scan")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--data-source"))
        .stdout(predicate::str::contains("--checks"))
        .stdout(predicate::str::contains("--assert"));
}

#[test]
fn test_missing_data_source_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required setting: data_source"));
}

#[test]
fn test_csv_without_output_is_rejected() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .args(["-d", "db_ca_kerry", "--csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_dry_run_prints_engine_command() {
    let dir = TempDir::new().unwrap();
    common::write_scan_files(dir.path());

    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .args(["-d", "db_ca_kerry", "-v", "date=2024-01-28", "--local", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "soda scan -d db_ca_kerry -c configuration.yml -v date=2024-01-28 -s db_ca_kerry_dq_checks -l -srf",
        ))
        .stdout(predicate::str::contains("Send to Soda Cloud: false"));
}

#[test]
fn test_missing_soda_binary_is_reported() {
    let dir = TempDir::new().unwrap();
    common::write_scan_files(dir.path());

    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .args(["-d", "db_ca_kerry", "--soda-bin", "dq-scan-no-such-soda"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Could not start the scan engine"));
}

#[cfg(unix)]
#[test]
fn test_full_run_with_fake_engine() {
    let dir = TempDir::new().unwrap();
    common::write_scan_files(dir.path());
    let soda = common::write_fake_soda(dir.path(), Some(common::RESULTS_JSON), 2);

    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .args(["-d", "db_ca_kerry", "-o", "output.json", "--csv", "--soda-bin"])
        .arg(&soda)
        .assert()
        .success()
        .stdout(predicate::str::contains("exit_code is 2"))
        .stdout(predicate::str::contains("Oops! 1 failures."))
        .stdout(predicate::str::contains(
            "1 checks failed:\n  missing_count(order_id) = 0 [orders] FAIL",
        ));

    assert!(dir.path().join("output.json").is_file());
    let csv = std::fs::read_to_string(dir.path().join("output.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);
}

#[cfg(unix)]
#[test]
fn test_propagate_exit_code() {
    let dir = TempDir::new().unwrap();
    common::write_scan_files(dir.path());
    let soda = common::write_fake_soda(dir.path(), Some(common::RESULTS_JSON), 2);

    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .args(["-d", "db_ca_kerry", "--propagate-exit-code", "--soda-bin"])
        .arg(&soda)
        .assert()
        .code(2);
}

#[cfg(unix)]
#[test]
fn test_assert_flag_fails_the_process() {
    let dir = TempDir::new().unwrap();
    common::write_scan_files(dir.path());
    let soda = common::write_fake_soda(dir.path(), Some(common::RESULTS_JSON), 2);

    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .args(["-d", "db_ca_kerry", "--assert", "no-checks-fail", "--soda-bin"])
        .arg(&soda)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing_count(order_id) = 0"));
}

fn write_profile(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    let path = dir.join("dq-scan.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_dry_run_resolves_files_in_profile_working_dir() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project");
    std::fs::create_dir(&project).unwrap();
    common::write_scan_files(&project);
    let project_str = project.to_string_lossy().into_owned();
    let profile = write_profile(
        dir.path(),
        &format!(
            "[scan]\ndata_source = \"db_ca_kerry\"\n\n[engine]\nworking_dir = {:?}\n",
            project_str
        ),
    );

    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .arg("--profile")
        .arg(&profile)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Working directory: {}",
            project_str
        )))
        .stdout(predicate::str::contains(format!(
            "-c {}",
            project.join("configuration.yml").display()
        )));
}

#[test]
fn test_profile_verbose_raises_log_level() {
    let dir = TempDir::new().unwrap();
    common::write_scan_files(dir.path());

    let quiet = write_profile(dir.path(), "[scan]\ndata_source = \"db_ca_kerry\"\n");
    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--profile")
        .arg(&quiet)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved settings").not());

    let verbose = write_profile(
        dir.path(),
        "[scan]\ndata_source = \"db_ca_kerry\"\nverbose = true\n",
    );
    Command::cargo_bin("dq-scan")
        .unwrap()
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--profile")
        .arg(&verbose)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved settings"))
        .stdout(predicate::str::contains(" -V "));
}
