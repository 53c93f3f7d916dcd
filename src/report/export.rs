//! CSV export of parsed entries.
//!
//! One row per entry in file order. The header is written bare; data
//! fields are quoted unless numeric, so the message column is always
//! quoted and the status code never is. Embedded quotes are doubled.

use crate::error::AnalyzerError;
use crate::models::LogEntry;
use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use tracing::info;

/// Fixed header row.
pub const CSV_HEADER: [&str; 5] = ["Timestamp", "Level", "Message", "IP Address", "Status Code"];

/// Write the header and one record per entry into `writer`.
///
/// The underlying writer is flushed and handed back.
pub fn write_entries<W: io::Write>(writer: W, entries: &[LogEntry]) -> Result<W, csv::Error> {
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);
    header.write_record(CSV_HEADER)?;
    let writer = header
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    let mut rows = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(writer);

    for entry in entries {
        let status = entry
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_default();

        rows.write_record([
            entry.timestamp.as_str(),
            entry.level.as_str(),
            entry.message.as_str(),
            entry.ip_address.as_str(),
            status.as_str(),
        ])?;
    }

    rows.flush()?;
    rows.into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Write all entries as CSV to `path`. Returns the number of data rows.
pub fn write_csv(entries: &[LogEntry], path: &Path) -> Result<usize, AnalyzerError> {
    let export_failed = |source| AnalyzerError::ExportFailed {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|e| export_failed(csv::Error::from(e)))?;
    write_entries(BufWriter::new(file), entries).map_err(export_failed)?;

    info!("Exported {} rows to {}", entries.len(), path.display());
    Ok(entries.len())
}
