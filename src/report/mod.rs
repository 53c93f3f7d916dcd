//! Report rendering and row export.

pub mod export;
pub mod generator;

pub use export::*;
pub use generator::*;
