//! Log file ingestion.
//!
//! Streams an input file line by line, classifies every line and records
//! the result into an [`Aggregator`]. The whole file is consumed before
//! any report is produced.

use crate::analysis::Aggregator;
use crate::error::AnalyzerError;
use crate::parser::LineClassifier;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Spinner refresh interval, in lines.
const PROGRESS_EVERY: usize = 1000;

/// Options controlling ingestion.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Show a spinner with the running line count.
    pub show_progress: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

/// Outcome of ingesting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestStats {
    /// File that was read.
    pub path: PathBuf,
    /// Number of lines classified.
    pub lines_read: usize,
}

/// Reads log files into an aggregator.
pub struct LogReader<'a> {
    classifier: &'a LineClassifier,
    options: IngestOptions,
}

impl<'a> LogReader<'a> {
    /// Create a reader that classifies with the given classifier.
    pub fn new(classifier: &'a LineClassifier, options: IngestOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    /// Read every line of `path` into `aggregator`.
    ///
    /// Failing to open or read the file is fatal; nothing recorded so far
    /// should be reported in that case.
    pub fn ingest_file(
        &self,
        path: &Path,
        aggregator: &mut Aggregator,
    ) -> Result<IngestStats, AnalyzerError> {
        let unreadable = |source: io::Error| AnalyzerError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(unreadable)?;
        debug!("Opened input: {}", path.display());

        let progress = self.progress_bar();
        let result = self.ingest_reader(BufReader::new(file), aggregator, progress.as_ref());

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        let lines_read = result.map_err(unreadable)?;

        info!("Parsed {} lines from {}", lines_read, path.display());

        Ok(IngestStats {
            path: path.to_path_buf(),
            lines_read,
        })
    }

    /// Read every line from `reader` into `aggregator`.
    ///
    /// Line terminators (`\n` or `\r\n`) are stripped. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn ingest_reader<R: BufRead>(
        &self,
        mut reader: R,
        aggregator: &mut Aggregator,
        progress: Option<&ProgressBar>,
    ) -> io::Result<usize> {
        let mut buf = Vec::new();
        let mut lines_read = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line = String::from_utf8_lossy(strip_line_ending(&buf));
            aggregator.record(self.classifier.classify(&line));
            lines_read += 1;

            if let Some(pb) = progress {
                if lines_read % PROGRESS_EVERY == 0 {
                    pb.set_message(format!("{} lines", lines_read));
                }
            }
        }

        Ok(lines_read)
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        if !self.options.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message("Parsing log lines...");
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    }
}

fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
