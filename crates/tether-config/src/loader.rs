//! Layered loading of configuration files into records.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tether_bind::{bind, merge, Options, Record, Value};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::format::Format;
use crate::source::Source;

/// One layer of configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPath {
    pub path: PathBuf,
    /// A missing required path fails the load; a missing optional one is
    /// skipped.
    pub required: bool,
}

impl ConfigPath {
    pub fn required(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
        }
    }

    pub fn optional(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: false,
        }
    }
}

/// Reads configuration layers from a [`Source`] and applies them to a
/// record in order, later layers overriding earlier ones.
pub struct Loader<S> {
    source: S,
    options: Options,
    strict: bool,
}

impl<S: Source> Loader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: Options::default(),
            strict: false,
        }
    }

    /// Converters and variants used when applying each layer.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Apply the first present layer with bind semantics, so `+required`
    /// fields must appear in it. Later layers are always merged.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Read and decode one path. `Ok(None)` when the path does not exist.
    pub fn read(&self, path: &Path) -> ConfigResult<Option<Value>> {
        if !self.source.exists(path)? {
            return Ok(None);
        }
        let format = Format::from_path(path)?;
        let text = self.source.read_to_string(path)?;
        format.decode(&text).map(Some)
    }

    /// Apply every present layer in `paths` to `record`.
    ///
    /// Returns the number of layers applied.
    pub fn load_into<R: Record>(&self, record: &mut R, paths: &[ConfigPath]) -> ConfigResult<usize> {
        let mut applied = 0;
        for layer in paths {
            let Some(raw) = self.read(&layer.path)? else {
                if layer.required {
                    return Err(ConfigError::Missing(layer.path.clone()));
                }
                debug!(path = %layer.path.display(), "optional config not found, skipping");
                continue;
            };
            let result = if self.strict && applied == 0 {
                bind(record, &raw, &self.options)
            } else {
                merge(record, &raw, &self.options)
            };
            result.map_err(|source| ConfigError::Apply {
                path: layer.path.clone(),
                source,
            })?;
            debug!(path = %layer.path.display(), "applied config layer");
            applied += 1;
        }
        Ok(applied)
    }

    /// Build a record from its default value and `paths`.
    pub fn load<R: Record + Default>(&self, paths: &[ConfigPath]) -> ConfigResult<R> {
        let mut record = R::default();
        self.load_into(&mut record, paths)?;
        Ok(record)
    }
}
