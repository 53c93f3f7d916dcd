//! Classifies raw log lines into structured entries.
//!
//! Lines are tested against an ordered list of patterns. The first
//! pattern that matches anywhere in the line wins and its extractor
//! builds the entry; when nothing matches the line is kept verbatim as
//! a raw entry.

use crate::error::AnalyzerError;
use crate::models::LogEntry;
use regex::{Captures, Regex};
use tracing::trace;

/// Common access-log layout: `host ident user [time] "request" status bytes`.
pub const ACCESS_LOG_PATTERN: &str = r#"(\S+) (\S+) (\S+) \[([^\]]+)\] "([^"]*)" ([0-9]+) ([0-9]+)"#;

/// Error-log layout: `[time] [level] message`.
pub const ERROR_LOG_PATTERN: &str = r"(\[.*?\]) (\[.*?\]) (.*)";

/// Builds an entry from the captures of a matched pattern.
type Extractor = fn(&Captures<'_>) -> LogEntry;

/// A compiled pattern paired with the extractor for its groups.
struct LinePattern {
    name: &'static str,
    regex: Regex,
    extract: Extractor,
}

/// Classifier holding the prioritized pattern list.
pub struct LineClassifier {
    patterns: Vec<LinePattern>,
}

impl LineClassifier {
    /// Compile the built-in patterns, access format first.
    pub fn new() -> Result<Self, AnalyzerError> {
        let patterns = vec![
            LinePattern {
                name: "access",
                regex: Regex::new(ACCESS_LOG_PATTERN)?,
                extract: extract_access,
            },
            LinePattern {
                name: "error",
                regex: Regex::new(ERROR_LOG_PATTERN)?,
                extract: extract_error,
            },
        ];

        Ok(Self { patterns })
    }

    /// Classify one line. Never fails; unknown lines become raw entries.
    pub fn classify(&self, line: &str) -> LogEntry {
        for pattern in &self.patterns {
            if let Some(caps) = pattern.regex.captures(line) {
                trace!("Line matched {} pattern", pattern.name);
                return (pattern.extract)(&caps);
            }
        }

        LogEntry::raw(line)
    }

    /// Names of the patterns in evaluation order.
    pub fn pattern_names(&self) -> Vec<&'static str> {
        self.patterns.iter().map(|p| p.name).collect()
    }
}

fn group<'a>(caps: &'a Captures<'_>, index: usize) -> &'a str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn extract_access(caps: &Captures<'_>) -> LogEntry {
    // Digit runs too long for a u16 leave the status unset.
    let status_code = group(caps, 6).parse::<u16>().ok();

    LogEntry::access(group(caps, 1), group(caps, 4), group(caps, 5), status_code)
}

fn extract_error(caps: &Captures<'_>) -> LogEntry {
    LogEntry::error(group(caps, 1), group(caps, 2), group(caps, 3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryFormat;

    fn classifier() -> LineClassifier {
        LineClassifier::new().unwrap()
    }

    #[test]
    fn test_access_line() {
        let entry = classifier()
            .classify(r#"10.0.0.1 - - [10/Oct/2023:13:55:36] "GET /index.html" 200 1024"#);

        assert_eq!(entry.format, EntryFormat::Access);
        assert_eq!(entry.ip_address, "10.0.0.1");
        assert_eq!(entry.timestamp, "10/Oct/2023:13:55:36");
        assert_eq!(entry.message, "GET /index.html");
        assert_eq!(entry.status_code, Some(200));
        assert!(entry.level.is_empty());
    }

    #[test]
    fn test_access_line_with_timezone_and_empty_request() {
        let entry = classifier()
            .classify(r#"192.168.1.7 ident frank [10/Oct/2000:13:55:36 -0700] "" 404 0"#);

        assert_eq!(entry.format, EntryFormat::Access);
        assert_eq!(entry.ip_address, "192.168.1.7");
        assert_eq!(entry.timestamp, "10/Oct/2000:13:55:36 -0700");
        assert_eq!(entry.message, "");
        assert_eq!(entry.status_code, Some(404));
    }

    #[test]
    fn test_access_pattern_matches_substring() {
        let entry = classifier().classify(
            r#"prefix noise 10.0.0.2 - - [10/Oct/2023:13:55:36] "POST /api" 500 12 trailing"#,
        );

        assert_eq!(entry.format, EntryFormat::Access);
        // Leftmost position where the whole pattern fits.
        assert_eq!(entry.ip_address, "10.0.0.2");
        assert_eq!(entry.message, "POST /api");
        assert_eq!(entry.status_code, Some(500));
    }

    #[test]
    fn test_oversized_status_is_unset() {
        let entry = classifier().classify(r#"10.0.0.1 - - [ts] "GET /" 99999999 10"#);
        assert_eq!(entry.format, EntryFormat::Access);
        assert_eq!(entry.status_code, None);
    }

    #[test]
    fn test_non_ascii_digits_fall_back() {
        let line = "10.0.0.1 - - [t] \"GET\" \u{662}\u{660}\u{660} \u{661}";
        let entry = classifier().classify(line);

        assert_eq!(entry.format, EntryFormat::Raw);
        assert_eq!(entry.message, line);
        assert!(entry.ip_address.is_empty());
    }

    #[test]
    fn test_error_line() {
        let entry = classifier().classify("[2023-10-10 13:55:36] [error] Connection refused");

        assert_eq!(entry.format, EntryFormat::Error);
        assert_eq!(entry.timestamp, "[2023-10-10 13:55:36]");
        assert_eq!(entry.level, "[error]");
        assert_eq!(entry.message, "Connection refused");
        assert!(entry.ip_address.is_empty());
        assert_eq!(entry.status_code, None);
    }

    #[test]
    fn test_error_line_keeps_later_brackets_in_message() {
        let entry =
            classifier().classify("[Mon Oct 10] [warn] [client 1.2.3.4] File does not exist");

        assert_eq!(entry.timestamp, "[Mon Oct 10]");
        assert_eq!(entry.level, "[warn]");
        assert_eq!(entry.message, "[client 1.2.3.4] File does not exist");
    }

    #[test]
    fn test_access_takes_priority_over_error() {
        let entry = classifier().classify(r#"[a] [b] c [ts] "GET /" 200 1"#);
        assert_eq!(entry.format, EntryFormat::Access);
        assert_eq!(entry.ip_address, "[a]");
    }

    #[test]
    fn test_unmatched_line_falls_back() {
        let entry = classifier().classify("random unparseable text");

        assert_eq!(entry, LogEntry::raw("random unparseable text"));
        assert!(entry.timestamp.is_empty());
        assert!(entry.level.is_empty());
        assert!(entry.ip_address.is_empty());
        assert_eq!(entry.status_code, None);
    }

    #[test]
    fn test_empty_line_falls_back() {
        let entry = classifier().classify("");
        assert_eq!(entry.format, EntryFormat::Raw);
        assert_eq!(entry.message, "");
    }

    #[test]
    fn test_pattern_order() {
        assert_eq!(classifier().pattern_names(), vec!["access", "error"]);
    }
}
