//! Analysis modules.
//!
//! Aggregation of classified entries and anomaly detection over the
//! final counts.

pub mod aggregator;
pub mod anomaly;

pub use aggregator::*;
pub use anomaly::*;
