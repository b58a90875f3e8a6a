//! CLI command implementations.

pub mod measure;

pub use measure::{cmd_measure, MeasureOpts};
