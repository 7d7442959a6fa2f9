//! Text formats understood by the loader.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tether_bind::Value;

use crate::error::{ConfigError, ConfigResult};

/// A configuration text format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
    Toml,
}

impl Format {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// Detect the format of a path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| ConfigError::UnknownFormat(path.to_path_buf()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
        }
    }

    /// Decode text into a raw value.
    pub fn decode(self, text: &str) -> ConfigResult<Value> {
        let decoded: Result<Value, String> = match self {
            Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        };
        decoded.map_err(|message| ConfigError::Decode {
            format: self,
            message,
        })
    }

    /// Encode a raw value as text.
    ///
    /// TOML needs a table at the top level and has no null; values that
    /// break either rule fail to encode.
    pub fn encode(self, value: &Value) -> ConfigResult<String> {
        let encoded: Result<String, String> = match self {
            Format::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
            Format::Toml => toml::to_string(value).map_err(|e| e.to_string()),
        };
        encoded.map_err(|message| ConfigError::Encode {
            format: self,
            message,
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode `text` in `format`.
pub fn decode(format: Format, text: &str) -> ConfigResult<Value> {
    format.decode(text)
}

/// Encode `value` in `format`.
pub fn encode(format: Format, value: &Value) -> ConfigResult<String> {
    format.encode(value)
}
