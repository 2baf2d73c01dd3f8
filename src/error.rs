//! Central error types for coldread.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` and `From` implementations.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum ColdreadError {
    /// A case label was lowered with no switch statement open.
    #[error("case label outside of any switch statement")]
    CaseOutsideSwitch,

    /// A single switch accumulated more case targets than the fan-out table holds.
    #[error("switch exceeds {limit} case targets")]
    TooManyCaseTargets { limit: usize },

    /// A function declared more labels (or parked more gotos) than the label table holds.
    #[error("function exceeds {limit} labels")]
    TooManyLabels { limit: usize },

    /// The input tree violated a structural contract of the frontend format.
    #[error("malformed syntax tree: {0}")]
    MalformedTree(&'static str),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Convenience type alias for Results using ColdreadError.
pub type Result<T> = std::result::Result<T, ColdreadError>;
