//! Bind, unbind, and merge engine for tether.
//!
//! Application code declares plain records with short per-field directives
//! and converts them to and from raw values (the mappings JSON/YAML/TOML
//! decoders produce).
//!
//! # Architecture
//!
//! - [`Bindable`] is the per-shape capability: scalars, containers, records,
//!   polymorphic values and references all implement it.
//! - [`Record`] describes a record's fields once (a [`Schema`] built from the
//!   [`record!`] / [`impl_record!`] macros) and hands out field slots; the
//!   [`walker`] does the rest.
//! - [`Options`] carries the caller's [`Converters`] and [`Variants`] through
//!   every call. There is no global registry.
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use tether_bind::{bind_new, record, unbind, Options};
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     pub struct Server {
//!         pub host: String => "host,+required",
//!         pub port: u16,
//!     }
//! }
//!
//! let options = Options::default();
//! let server: Server = bind_new(&json!({"host": "db", "port": 5432}), &options).unwrap();
//! assert_eq!(server.port, 5432);
//!
//! let raw = unbind(&server, &options).unwrap();
//! assert_eq!(raw["host"], "db");
//! ```

pub mod adapters;
pub mod bindable;
pub mod coerce;
pub mod context;
pub mod convert;
pub mod engine;
pub mod error;
pub mod graph;
pub mod options;
pub mod record;
pub mod variant;
pub mod walker;

pub use adapters::{Json, Text};
pub use bindable::{AsAny, Bindable};
pub use coerce::MapKey;
pub use context::{Context, InspectOptions, Mode};
pub use convert::{BoxError, Converters};
pub use engine::{bind, bind_new, inspect, merge, unbind};
pub use error::{BindError, BindResult};
pub use graph::{LinkNode, LinkReference, LinkVisitor};
pub use options::Options;
pub use record::{FieldDef, FieldSpec, Record, Schema};
pub use variant::{Constructor, Polymorphic, Variant, Variants};

pub use tether_types::{Annotation, RawMap, Value, DISCRIMINATOR_KEY, REF_KEY};
