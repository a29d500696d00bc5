use clap::Parser;
use dq_scan::utils::error::ErrorSeverity;
use dq_scan::utils::{logger, validation::Validate};
use dq_scan::{CliConfig, LocalStorage, RunSettings, ScanRunner, SodaCliEngine};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Failed to load run profile: {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌，verbose 可能來自 run profile
    if config.log_json {
        logger::init_json_logger(settings.verbose);
    } else {
        logger::init_cli_logger(settings.verbose);
    }

    tracing::info!("Starting dq-scan");
    if let Some(profile) = &config.profile {
        tracing::info!("📁 Loaded run profile from: {}", profile);
    }
    tracing::debug!("Resolved settings: {:?}", settings);

    // 驗證配置
    if let Err(e) = settings.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_settings_summary(&settings);

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - the scan engine will not be started");
        perform_dry_run(&settings)?;
        return Ok(());
    }

    let mut engine = SodaCliEngine::new(settings.soda_bin.clone());
    if let Some(dir) = &settings.working_dir {
        engine = engine.with_working_dir(dir);
    }
    let storage = LocalStorage::new(settings.output_dir.clone());
    let runner = ScanRunner::new(engine, storage, settings);

    match runner.run().await {
        Ok(report) => {
            tracing::info!("✅ Scan completed with exit code {}", report.exit_code);
            println!("{}", report.summary);
            println!(
                "⏱️  Started {} (took {:.1}s)",
                report.started_at.to_rfc3339(),
                report.duration().as_secs_f64()
            );
            if let Some(path) = &report.json_path {
                println!("📁 Scan results saved to: {}", path);
            }
            if let Some(path) = &report.csv_path {
                println!("📁 Metrics saved to: {}", path);
            }

            if config.propagate_exit_code && report.exit_code != 0 {
                std::process::exit(report.exit_code);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Scan failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_settings_summary(settings: &RunSettings) {
    println!("📋 Scan Settings:");
    println!("  Data source: {}", settings.data_source);
    println!("  Configuration: {}", settings.configuration_files.join(", "));
    println!("  Checks: {}", settings.checks_files.join(", "));

    if !settings.variables.is_empty() {
        let variables: Vec<String> = settings
            .variables
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        println!("  Variables: {}", variables.join(", "));
    }

    if let Some(output) = &settings.output_file {
        let csv = if settings.save_csv { " (+ CSV)" } else { "" };
        println!("  Output: {}{}", output, csv);
    }

    println!();
}

fn perform_dry_run(settings: &RunSettings) -> Result<(), Box<dyn std::error::Error>> {
    let scan = settings.build_scan();
    scan.validate()?;
    let request = scan.build_request()?;

    let args: Vec<String> =
        SodaCliEngine::build_args(&request, Path::new("<scan results file>"))
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();

    println!("🔍 Dry Run Analysis:");
    println!("  Scan definition: {}", request.scan_definition);
    println!("  Send to Soda Cloud: {}", !request.local);
    if let Some(dir) = &settings.working_dir {
        println!("  Working directory: {}", dir);
    }
    println!("  Assertion: {:?}", settings.assert);
    println!("  Command: {} {}", settings.soda_bin, args.join(" "));
    println!();
    println!("✅ Dry run analysis complete.");

    Ok(())
}
