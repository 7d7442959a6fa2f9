//! Error types for bind, unbind, and merge operations.

use thiserror::Error;

use crate::convert::BoxError;

/// Errors produced while converting between records and raw values.
///
/// Leaf failures (type mismatches, conversions, unsupported shapes) are
/// wrapped exactly once in [`BindError::Binding`] or
/// [`BindError::Unbinding`] naming the innermost declared field. Constraint
/// failures ([`BindError::RequiredField`], [`BindError::ValueMismatch`])
/// already name their field and propagate unwrapped from any depth.
#[derive(Debug, Error)]
pub enum BindError {
    /// Malformed call or ambiguous output.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The raw shape disagrees with the declared type.
    #[error("type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// A coercion or custom converter failed.
    #[error("conversion to {target} failed at {path}: {source}")]
    Conversion {
        path: String,
        target: &'static str,
        #[source]
        source: BoxError,
    },

    /// A field could not be bound.
    #[error("binding {record}.{field} (key {key:?}) failed: {source}")]
    Binding {
        record: &'static str,
        field: &'static str,
        key: String,
        #[source]
        source: Box<BindError>,
    },

    /// A field could not be unbound.
    #[error("unbinding {record}.{field} (key {key:?}) failed: {source}")]
    Unbinding {
        record: &'static str,
        field: &'static str,
        key: String,
        #[source]
        source: Box<BindError>,
    },

    /// A key mapped to a `+required` field is missing.
    #[error("{record}.{field}: required key {key:?} is missing at {path}")]
    RequiredField {
        record: &'static str,
        field: &'static str,
        key: String,
        path: String,
    },

    /// A `+match` constraint was violated.
    #[error("{record}.{field}: expected value {expected:?}, found {found:?}")]
    ValueMismatch {
        record: &'static str,
        field: &'static str,
        expected: String,
        found: String,
    },

    /// A field shape with no defined handling.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// More than one `+extra` field on one record level.
    #[error("record {record} declares more than one overflow field")]
    MultipleExtra { record: &'static str },
}

impl BindError {
    /// The wrapped cause of a field-level wrapper, or `self`.
    pub fn innermost(&self) -> &BindError {
        match self {
            BindError::Binding { source, .. } | BindError::Unbinding { source, .. } => {
                source.innermost()
            }
            other => other,
        }
    }

    /// Whether this error should be wrapped with field context.
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(
            self,
            BindError::TypeMismatch { .. }
                | BindError::Conversion { .. }
                | BindError::Unsupported(_)
                | BindError::Validation(_)
        )
    }
}

/// Convenience alias for bind results.
pub type BindResult<T> = Result<T, BindError>;
