//! Error types for the analysis pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the analyzer's I/O boundaries.
///
/// Malformed log lines are never errors; they degrade to raw entries.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The input log could not be opened or read. Fatal to the run.
    #[error("Unable to open file {}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The CSV export target could not be written. The run continues.
    #[error("Unable to create CSV file {}", path.display())]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The report could not be written to its destination.
    #[error("Failed to write report to {destination}")]
    ReportWrite {
        destination: String,
        #[source]
        source: io::Error,
    },

    /// A built-in line pattern failed to compile.
    #[error("Invalid line pattern")]
    Pattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_path() {
        let err = AnalyzerError::InputUnreadable {
            path: PathBuf::from("/var/log/missing.log"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/var/log/missing.log"));

        let err = AnalyzerError::ExportFailed {
            path: PathBuf::from("out.csv"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied").into(),
        };
        assert!(err.to_string().starts_with("Unable to create CSV file out.csv"));
    }

    #[test]
    fn test_cause_is_reported_once() {
        let err = AnalyzerError::InputUnreadable {
            path: PathBuf::from("/nonexistent"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(err.to_string(), "Unable to open file /nonexistent");

        let chained = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(
            chained,
            "Unable to open file /nonexistent: No such file or directory"
        );
        assert_eq!(chained.matches("No such file").count(), 1);
    }
}
