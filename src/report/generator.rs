//! Analysis report generation.
//!
//! This module renders the aggregate state and anomaly findings as a
//! plain-text report, or as JSON for machine consumption.

use crate::analysis::Aggregator;
use crate::error::AnalyzerError;
use crate::models::{Alert, AnalysisSummary, IpCount};
use anyhow::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Generate the complete text report.
pub fn generate_text_report(aggregator: &Aggregator, alerts: &[Alert], top_n: usize) -> String {
    let mut output = String::new();

    output.push_str("=== Log Analysis Report ===\n");

    output.push_str(&generate_error_summary_section(aggregator.level_counts()));

    output.push_str(&generate_ip_section(
        aggregator.unique_ip_count(),
        &aggregator.top_ips(top_n),
        top_n,
    ));

    output.push_str(&generate_alerts_section(alerts));

    output
}

/// Generate the per-level occurrence counts.
fn generate_error_summary_section(level_counts: &BTreeMap<String, usize>) -> String {
    let mut section = String::new();

    section.push_str("\nError Summary:\n");
    for (level, count) in level_counts {
        section.push_str(&format!("{}: {} occurrences\n", level, count));
    }

    section
}

/// Generate the client access section.
fn generate_ip_section(unique_ips: usize, top: &[IpCount], top_n: usize) -> String {
    let mut section = String::new();

    section.push_str("\nIP Access Analysis:\n");
    section.push_str(&format!("Total Unique IPs: {}\n", unique_ips));
    section.push_str(&format!("Top {} Most Active IPs:\n", top_n));

    for row in top {
        section.push_str(&format!("{}: {} accesses\n", row.ip, row.count));
    }

    section
}

/// Generate the anomaly section. Empty when nothing was flagged.
fn generate_alerts_section(alerts: &[Alert]) -> String {
    let mut section = String::new();

    section.push_str("\nUnusual Activity Detection:\n");
    for alert in alerts {
        section.push_str(&format!("{}: {}\n", alert.tag(), alert));
    }

    section
}

/// Collect a serializable summary of the run.
pub fn build_summary(
    aggregator: &Aggregator,
    alerts: &[Alert],
    source: &str,
    top_n: usize,
) -> AnalysisSummary {
    AnalysisSummary {
        generated_at: Utc::now(),
        source: source.to_string(),
        total_entries: aggregator.total_entries(),
        formats: aggregator.format_counts(),
        level_counts: aggregator.level_counts().clone(),
        unique_ips: aggregator.unique_ip_count(),
        top_ips: aggregator.top_ips(top_n),
        alerts: alerts.to_vec(),
    }
}

/// Generate a JSON report.
pub fn generate_json_report(summary: &AnalysisSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write a rendered report to a file, or to stdout when no path is given.
pub fn write_report(content: &str, destination: Option<&Path>) -> Result<(), AnalyzerError> {
    match destination {
        Some(path) => std::fs::write(path, content).map_err(|source| AnalyzerError::ReportWrite {
            destination: path.display().to_string(),
            source,
        }),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(content.as_bytes())
                .and_then(|_| handle.flush())
                .map_err(|source| AnalyzerError::ReportWrite {
                    destination: "stdout".to_string(),
                    source,
                })
        }
    }
}
