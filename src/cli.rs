//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::error::ErrorKind;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logaz - batch analyzer for server access and error logs
///
/// Classifies every line of a log file, summarizes error levels and
/// client activity, and flags unusual rates.
///
/// Examples:
///   logaz /var/log/apache2/access.log
///   logaz access.log entries.csv
///   logaz error.log --format json --report-output report.json
///   logaz access.log --top 10 --ip-threshold 15
///   logaz --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Log file to analyze
    #[arg(value_name = "LOG_FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Optional CSV file to export the parsed entries to
    #[arg(value_name = "OUTPUT_CSV")]
    pub csv_output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .logaz.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub report_output: Option<PathBuf>,

    /// Report format (text, json)
    #[arg(long, value_name = "FORMAT", env = "LOGAZ_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Number of clients to list in the most-active table
    #[arg(long, value_name = "COUNT")]
    pub top: Option<usize>,

    /// Flag a level whose share of entries exceeds this percentage
    #[arg(long, value_name = "PCT")]
    pub error_threshold: Option<f64>,

    /// Flag a client whose share of entries exceeds this percentage
    #[arg(long, value_name = "PCT")]
    pub ip_threshold: Option<f64>,

    /// Exit with code 2 when any unusual activity is detected
    ///
    /// Useful for CI pipelines and cron checks.
    #[arg(long)]
    pub fail_on_alert: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .logaz.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text (default)
    #[default]
    Text,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Errors are returned instead of exiting so the caller controls the
    /// exit code; see [`Args::parse_error_exit_code`].
    pub fn parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Parse arguments from an explicit iterator.
    pub fn parse_args_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(itr)
    }

    /// Exit code for a failed parse: 0 for --help/--version, 1 otherwise.
    pub fn parse_error_exit_code(err: &clap::Error) -> i32 {
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.top == Some(0) {
            return Err("--top must be at least 1".to_string());
        }

        for (flag, value) in [
            ("--error-threshold", self.error_threshold),
            ("--ip-threshold", self.ip_threshold),
        ] {
            if let Some(pct) = value {
                if !(0.0..=100.0).contains(&pct) {
                    return Err(format!("{} must be between 0 and 100", flag));
                }
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let (Some(csv), Some(report)) = (&self.csv_output, &self.report_output) {
            if csv == report {
                return Err("CSV export and report output must be different files".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
