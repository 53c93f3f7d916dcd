//! Logaz - server log analyzer
//!
//! A CLI tool that classifies access-log and error-log lines, aggregates
//! error levels and client activity, flags unusual rates and optionally
//! exports the parsed entries as CSV.
//!
//! Exit codes:
//!   0 - Success (CSV export failures are reported but do not fail the run)
//!   1 - Invalid arguments or unreadable input file
//!   2 - Unusual activity detected and --fail-on-alert set

mod analysis;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod parser;
mod report;

use analysis::{Aggregator, AnomalyDetector};
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use ingest::{IngestOptions, LogReader};
use parser::LineClassifier;
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments. Usage errors exit with 1, not clap's 2.
    let args = match Args::parse_args() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            std::process::exit(Args::parse_error_exit_code(&e));
        }
    };

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Logaz v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .logaz.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("Created {} with default settings.", CONFIG_FILE_NAME);
    println!("Edit it to customize thresholds, report size and format.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Log output goes to stderr so the report on stdout stays clean.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete analysis. Returns the exit code (0 or 2).
fn run_analysis(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.analysis.validate()?;

    let input = args.input.clone().context("A log file path is required")?;

    // Step 1: Parse and aggregate the whole input
    let classifier = LineClassifier::new()?;
    debug!("Line patterns: {:?}", classifier.pattern_names());
    let reader = LogReader::new(
        &classifier,
        IngestOptions {
            show_progress: !args.quiet,
        },
    );

    let mut aggregator = Aggregator::new();
    let stats = reader.ingest_file(&input, &mut aggregator)?;
    if aggregator.is_empty() {
        warn!("{} contains no log lines", stats.path.display());
    }

    let formats = aggregator.format_counts();
    debug!(
        "{} lines: {} access, {} error, {} unrecognized",
        stats.lines_read, formats.access, formats.error, formats.raw
    );

    // Step 2: Detect unusual activity
    let detector = AnomalyDetector::new(config.analysis.thresholds());
    debug!("Thresholds: {:?}", detector.thresholds());
    let alerts = detector.detect_for(&aggregator);
    if !alerts.is_empty() {
        warn!("Detected {} unusual activity alert(s)", alerts.len());
    }

    // Step 3: Render and write the report
    let top_n = config.analysis.top_ips;
    let output = match config.general.format {
        OutputFormat::Json => {
            let source = stats.path.display().to_string();
            let summary = report::build_summary(&aggregator, &alerts, &source, top_n);
            report::generate_json_report(&summary)?
        }
        OutputFormat::Text => report::generate_text_report(&aggregator, &alerts, top_n),
    };

    report::write_report(&output, args.report_output.as_deref())?;
    if let Some(ref path) = args.report_output {
        info!("Report saved to {}", path.display());
    }

    // Step 4: Optional CSV export, failures are not fatal
    if let Some(ref csv_path) = args.csv_output {
        match report::write_csv(aggregator.entries(), csv_path) {
            Ok(_) => {
                if !args.quiet {
                    eprintln!("Log data exported to {}", csv_path.display());
                }
            }
            Err(e) => {
                let e = anyhow::Error::from(e);
                warn!("CSV export failed: {:#}", e);
                eprintln!("Error: {:#}", e);
            }
        }
    }

    if args.fail_on_alert && !alerts.is_empty() {
        eprintln!(
            "Unusual activity detected ({} alert(s)). Failing (exit code 2).",
            alerts.len()
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
