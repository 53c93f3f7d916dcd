//! Line classification.

pub mod classifier;

pub use classifier::*;
