//! Capabilities a record exposes to the linker.

/// A record that reports a stable logical identifier.
///
/// Only records behind [`Shared`](crate::Shared) are registered. `None` or
/// an empty id leaves the record out of the registry.
pub trait Identifiable {
    fn logical_id(&self) -> Option<&str>;
}
