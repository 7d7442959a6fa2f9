//! Configuration files for tether records.
//!
//! A [`Loader`] reads JSON, YAML or TOML documents from a [`Source`],
//! decodes them to raw values and merges them over a record in order, so a
//! base file can be refined by environment or local overrides. Paths are
//! [`ConfigPath`]s: missing required paths fail the load, missing optional
//! ones are skipped.

pub mod error;
pub mod format;
pub mod loader;
pub mod source;

pub use error::{ConfigError, ConfigResult};
pub use format::{decode, encode, Format};
pub use loader::{ConfigPath, Loader};
pub use source::{FsSource, MemorySource, Source};

use tether_bind::{unbind, Options, Record, Value};

/// Unbind `record` and encode it as text in `format`.
pub fn to_string<R: Record>(record: &R, format: Format, options: &Options) -> ConfigResult<String> {
    let raw = unbind(record, options)?;
    format.encode(&Value::Object(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_bind::{bind_new, record};

    record! {
        #[derive(Debug, Default)]
        struct Endpoint {
            host: String,
            port: u16,
        }
    }

    #[test]
    fn encodes_in_every_format() {
        let options = Options::default();
        let endpoint = Endpoint {
            host: "h".into(),
            port: 9,
        };
        for format in [Format::Json, Format::Yaml, Format::Toml] {
            let text = to_string(&endpoint, format, &options).unwrap();
            let back: Endpoint = bind_new(&format.decode(&text).unwrap(), &options).unwrap();
            assert_eq!(back.host, "h");
            assert_eq!(back.port, 9);
        }
    }
}
