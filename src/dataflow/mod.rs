//! Backward may-analysis over lowered graphs.
//!
//! # Modules
//!
//! - [`engine`]: Fixpoint propagation filling the per-node IN/OUT sets

pub mod engine;

pub use engine::{compute, AnalysisMetrics};
