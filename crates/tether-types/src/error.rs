//! Error types for foundation type operations.

use thiserror::Error;

/// Errors produced by foundation type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// Duration text does not follow the `<decimal><unit>` format.
    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    /// The duration does not fit in a `Duration`.
    #[error("duration out of range: {0}")]
    DurationOverflow(String),
}

/// Convenience alias for foundation type results.
pub type TypeResult<T> = Result<T, TypeError>;
