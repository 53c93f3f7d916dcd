//! Data models for the log analyzer.
//!
//! This module contains the core data structures shared by the parser,
//! the aggregation stage and the report generators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which line format produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryFormat {
    /// Web server access line (client IP, request, status code).
    Access,
    /// Error line with bracketed timestamp and level.
    Error,
    /// Nothing matched; the raw line is kept as the message.
    Raw,
}

/// A single classified log line.
///
/// Every entry has one uniform shape regardless of format; fields the
/// matched format does not supply are left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Format that matched this line.
    pub format: EntryFormat,
    /// Timestamp text, kept verbatim.
    pub timestamp: String,
    /// Severity label such as `[error]`.
    pub level: String,
    /// Request line, error text or the whole raw line.
    pub message: String,
    /// Client address for access lines.
    pub ip_address: String,
    /// HTTP status, only present on access lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl LogEntry {
    /// Creates an access-log entry.
    pub fn access(
        ip_address: impl Into<String>,
        timestamp: impl Into<String>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self {
            format: EntryFormat::Access,
            timestamp: timestamp.into(),
            level: String::new(),
            message: message.into(),
            ip_address: ip_address.into(),
            status_code,
        }
    }

    /// Creates an error-log entry.
    pub fn error(
        timestamp: impl Into<String>,
        level: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            format: EntryFormat::Error,
            timestamp: timestamp.into(),
            level: level.into(),
            message: message.into(),
            ip_address: String::new(),
            status_code: None,
        }
    }

    /// Creates a fallback entry holding the unparsed line.
    pub fn raw(line: impl Into<String>) -> Self {
        Self {
            format: EntryFormat::Raw,
            timestamp: String::new(),
            level: String::new(),
            message: line.into(),
            ip_address: String::new(),
            status_code: None,
        }
    }
}

/// A finding produced by the anomaly detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Alert {
    /// A level accounts for too large a share of all entries.
    HighErrorRate { level: String, rate: f64 },
    /// A single client accounts for too large a share of all entries.
    ExcessiveAccess { ip: String, rate: f64 },
}

impl Alert {
    /// Prefix printed in front of the alert in the text report.
    pub fn tag(&self) -> &'static str {
        match self {
            Alert::HighErrorRate { .. } => "ALERT",
            Alert::ExcessiveAccess { .. } => "SUSPICIOUS",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::HighErrorRate { level, rate } => {
                write!(f, "High {} error rate: {}%", level, format_rate(*rate))
            }
            Alert::ExcessiveAccess { ip, rate } => {
                write!(f, "IP {} has excessive access: {}%", ip, format_rate(*rate))
            }
        }
    }
}

/// Formats a percentage with six significant digits and no trailing zeros.
pub fn format_rate(rate: f64) -> String {
    if !rate.is_finite() {
        return rate.to_string();
    }
    if rate == 0.0 {
        return "0".to_string();
    }

    let int_digits = rate.abs().log10().floor() as i32 + 1;
    let decimals = (6 - int_digits).max(0) as usize;
    let text = format!("{:.*}", decimals, rate);

    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// One row of the most-active-clients table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpCount {
    pub ip: String,
    pub count: usize,
}

/// Number of entries per line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatCounts {
    pub access: usize,
    pub error: usize,
    pub raw: usize,
}

impl FormatCounts {
    /// Bumps the counter for the given format.
    pub fn bump(&mut self, format: EntryFormat) {
        match format {
            EntryFormat::Access => self.access += 1,
            EntryFormat::Error => self.error += 1,
            EntryFormat::Raw => self.raw += 1,
        }
    }
}

/// Serializable snapshot of a finished analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// When the summary was produced.
    pub generated_at: DateTime<Utc>,
    /// Input file that was analyzed.
    pub source: String,
    /// Number of lines classified.
    pub total_entries: usize,
    /// Breakdown of entries by matched format.
    pub formats: FormatCounts,
    /// Occurrences per level label.
    pub level_counts: BTreeMap<String, usize>,
    /// Number of distinct client addresses.
    pub unique_ips: usize,
    /// Most active clients, busiest first.
    pub top_ips: Vec<IpCount>,
    /// Anomaly findings.
    pub alerts: Vec<Alert>,
}
