//! Running aggregation over classified entries.
//!
//! The aggregator owns every piece of per-run state: the ordered entry
//! list, the level histogram, the per-client histogram and the set of
//! distinct clients. Maps are ordered by key so summaries iterate the
//! same way on every run.

use crate::models::{FormatCounts, IpCount, LogEntry};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregate state for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregator {
    entries: Vec<LogEntry>,
    level_counts: BTreeMap<String, usize>,
    ip_counts: BTreeMap<String, usize>,
    unique_ips: BTreeSet<String>,
    formats: FormatCounts,
}

impl Aggregator {
    /// Create empty aggregate state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one entry: update the histograms and append it in file order.
    pub fn record(&mut self, entry: LogEntry) {
        if !entry.level.is_empty() {
            *self.level_counts.entry(entry.level.clone()).or_insert(0) += 1;
        }

        if !entry.ip_address.is_empty() {
            *self.ip_counts.entry(entry.ip_address.clone()).or_insert(0) += 1;
            self.unique_ips.insert(entry.ip_address.clone());
        }

        self.formats.bump(entry.format);
        self.entries.push(entry);
    }

    /// Clear all state so the aggregator can be reused.
    #[allow(dead_code)] // Utility for reusing one aggregator across inputs
    pub fn reset(&mut self) {
        self.entries.clear();
        self.level_counts.clear();
        self.ip_counts.clear();
        self.unique_ips.clear();
        self.formats = FormatCounts::default();
    }

    /// All recorded entries in insertion order.
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Occurrences per level label.
    pub fn level_counts(&self) -> &BTreeMap<String, usize> {
        &self.level_counts
    }

    /// Accesses per client address.
    pub fn ip_counts(&self) -> &BTreeMap<String, usize> {
        &self.ip_counts
    }

    /// Number of distinct client addresses seen.
    pub fn unique_ip_count(&self) -> usize {
        self.unique_ips.len()
    }

    /// Number of recorded entries.
    pub fn total_entries(&self) -> usize {
        self.entries.len()
    }

    /// Entries per matched format.
    pub fn format_counts(&self) -> FormatCounts {
        self.formats
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `n` busiest clients, highest count first. Ties go to the
    /// lexically smaller address.
    pub fn top_ips(&self, n: usize) -> Vec<IpCount> {
        let mut ranked: Vec<IpCount> = self
            .ip_counts
            .iter()
            .map(|(ip, count)| IpCount {
                ip: ip.clone(),
                count: *count,
            })
            .collect();

        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.ip.cmp(&b.ip)));
        ranked.truncate(n);

        ranked
    }
}
