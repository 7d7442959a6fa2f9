//! Error type of the facade.

use thiserror::Error;

/// Any error a [`Session`](crate::Session) operation can return.
#[derive(Debug, Error)]
pub enum TetherError {
    /// Converting between a record and raw data failed.
    #[error("bind error: {0}")]
    Bind(#[from] tether_bind::BindError),

    /// A reference could not be resolved.
    #[error("link error: {0}")]
    Link(#[from] tether_link::LinkError),

    /// A configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] tether_config::ConfigError),
}

/// Convenience alias for facade results.
pub type TetherResult<T> = Result<T, TetherError>;
