//! Error types for reference linking.

use thiserror::Error;

/// Errors produced while linking references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// No registered record of the target type carries the referenced id.
    #[error("unresolved reference {reference:?} to {type_name}")]
    Unresolved {
        type_name: &'static str,
        reference: String,
    },
}

/// Convenience alias for link results.
pub type LinkResult<T> = Result<T, LinkError>;
