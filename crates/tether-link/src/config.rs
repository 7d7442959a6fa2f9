//! Linker configuration.

use serde::{Deserialize, Serialize};

/// Behaviour switches for a [`Linker`](crate::Linker).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Skip shared records this linker has already scanned during
    /// registration. Records scanned once are not rescanned even if they
    /// changed since.
    pub enable_caching: bool,
    /// Leave dangling references unresolved instead of failing the call.
    pub allow_partial_resolution: bool,
}

impl LinkerConfig {
    /// Fail on the first dangling reference, rescan on every call.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Best-effort resolution: dangling references are reported, not fatal.
    pub fn partial() -> Self {
        Self {
            allow_partial_resolution: true,
            ..Default::default()
        }
    }

    pub fn with_caching(mut self, enable: bool) -> Self {
        self.enable_caching = enable;
        self
    }
}
