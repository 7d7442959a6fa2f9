//! Error types for configuration loading.

use std::path::PathBuf;

use tether_bind::BindError;
use thiserror::Error;

use crate::format::Format;

/// Errors produced while reading, decoding or applying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required config path does not exist.
    #[error("required config {0} not found")]
    Missing(PathBuf),

    /// The path has no recognised extension.
    #[error("cannot tell the format of {0} from its extension")]
    UnknownFormat(PathBuf),

    /// Reading the source failed.
    #[error("reading {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The text is not a valid document in its format.
    #[error("{format} decode error: {message}")]
    Decode { format: Format, message: String },

    /// The raw value cannot be written in the format.
    #[error("{format} encode error: {message}")]
    Encode { format: Format, message: String },

    /// A document decoded but did not bind onto the record.
    #[error("applying {path} failed: {source}")]
    Apply {
        path: PathBuf,
        #[source]
        source: BindError,
    },

    /// Binding or unbinding failed outside of a file.
    #[error(transparent)]
    Bind(#[from] BindError),
}

/// Convenience alias for config results.
pub type ConfigResult<T> = Result<T, ConfigError>;
