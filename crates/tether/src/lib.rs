//! Typed records to and from raw data, with references between them.
//!
//! This is the main entry point for applications using tether. It
//! re-exports the engine crates and adds [`Session`], which threads one set
//! of [`Options`] and one [`Linker`] through binding, loading and linking.

pub mod error;
pub mod session;

pub use error::{TetherError, TetherResult};
pub use session::{load_linked, Session};

pub use tether_bind::{
    bind, bind_new, impl_record, inspect, merge, record, unbind, BindError, Bindable, Context,
    Converters, InspectOptions, Json, Options, Polymorphic, Record, Text, Variant, Variants,
};
pub use tether_config::{ConfigPath, Format, FsSource, Loader, MemorySource, Source};
pub use tether_link::{
    link, Identifiable, LinkReport, Linker, LinkerConfig, Pointer, PointerState, Shared,
};
pub use tether_types::{external_name, Annotation, RawMap, Value};

/// Everything needed to declare and use records.
pub mod prelude {
    pub use crate::{
        bind, bind_new, impl_record, inspect, merge, record, unbind, Bindable, Identifiable,
        InspectOptions, Json, Options, Pointer, Polymorphic, Record, Session, Shared, Text,
        Variant,
    };
}
