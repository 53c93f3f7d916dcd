//! Rate-based anomaly detection.
//!
//! A level or a client is flagged when its share of all entries is
//! strictly greater than the configured percentage.

use super::Aggregator;
use crate::models::Alert;
use std::collections::BTreeMap;
use tracing::debug;

/// Percentages above which an alert is raised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Share of entries carrying one level.
    pub error_rate: f64,
    /// Share of entries coming from one client.
    pub ip_access_rate: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            error_rate: 10.0,
            ip_access_rate: 20.0,
        }
    }
}

/// Applies [`Thresholds`] to final aggregate counts.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    thresholds: Thresholds,
}

impl AnomalyDetector {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Compute alerts from level and client histograms.
    ///
    /// Level alerts come first, then client alerts, each in key order.
    /// An empty run yields no alerts.
    pub fn detect(
        &self,
        level_counts: &BTreeMap<String, usize>,
        ip_counts: &BTreeMap<String, usize>,
        total_entries: usize,
    ) -> Vec<Alert> {
        if total_entries == 0 {
            debug!("No entries recorded, skipping anomaly detection");
            return Vec::new();
        }

        let total = total_entries as f64;
        let mut alerts = Vec::new();

        for (level, count) in level_counts {
            let rate = (*count as f64 * 100.0) / total;
            if rate > self.thresholds.error_rate {
                alerts.push(Alert::HighErrorRate {
                    level: level.clone(),
                    rate,
                });
            }
        }

        for (ip, count) in ip_counts {
            let rate = (*count as f64 * 100.0) / total;
            if rate > self.thresholds.ip_access_rate {
                alerts.push(Alert::ExcessiveAccess {
                    ip: ip.clone(),
                    rate,
                });
            }
        }

        debug!("Anomaly detection raised {} alert(s)", alerts.len());
        alerts
    }

    /// Run detection against an aggregator's final state.
    pub fn detect_for(&self, aggregator: &Aggregator) -> Vec<Alert> {
        self.detect(
            aggregator.level_counts(),
            aggregator.ip_counts(),
            aggregator.total_entries(),
        )
    }
}
