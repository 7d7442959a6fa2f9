//! Per-call configuration: custom converters and polymorphic constructors.

use std::collections::HashMap;

use tether_types::Value;

use crate::convert::{BoxError, Converters};
use crate::variant::Variants;

/// Configuration threaded through every bind, unbind, and merge call.
///
/// Several independent configurations can coexist in one process; nothing
/// here is global.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Custom converters, consulted before built-in coercion.
    pub converters: Converters,
    /// Polymorphic constructors used by every field without its own set.
    pub variants: Variants,
    /// Polymorphic constructors for one field, keyed by
    /// `module::Record.field` or the short `Record.field`.
    ///
    /// A field with an entry here uses it exclusively. The short form
    /// applies to every record type of that name.
    pub field_variants: HashMap<String, Variants>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom converter for `T`.
    pub fn with_converter<T, F, G, E>(mut self, from_raw: F, to_raw: G) -> Self
    where
        T: std::any::Any,
        F: Fn(&Value) -> Result<T, E> + Send + Sync + 'static,
        G: Fn(&T) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.converters.register(from_raw, to_raw);
        self
    }

    /// Add a polymorphic constructor available to every field.
    pub fn with_variant<T, F>(mut self, discriminator: impl Into<String>, constructor: F) -> Self
    where
        T: ?Sized + 'static,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.variants.register::<T, F>(discriminator, constructor);
        self
    }

    /// Add a polymorphic constructor for one field.
    ///
    /// `field_path` is `module::Record.field` (the module as reported by
    /// `module_path!()` where the record is declared) or `Record.field`.
    pub fn with_field_variant<T, F>(
        mut self,
        field_path: impl Into<String>,
        discriminator: impl Into<String>,
        constructor: F,
    ) -> Self
    where
        T: ?Sized + 'static,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.field_variants
            .entry(field_path.into())
            .or_default()
            .register::<T, F>(discriminator, constructor);
        self
    }

    /// The constructors that apply to the given field.
    ///
    /// A qualified path is looked up as given first, then by its
    /// `Record.field` suffix.
    pub fn variants_for(&self, field_path: Option<&str>) -> &Variants {
        let Some(path) = field_path else {
            return &self.variants;
        };
        if let Some(scoped) = self.field_variants.get(path) {
            return scoped;
        }
        let short = path.rsplit("::").next().unwrap_or(path);
        self.field_variants.get(short).unwrap_or(&self.variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Label = dyn std::fmt::Display + Send + Sync;

    #[test]
    fn field_scope_is_exclusive() {
        let options = Options::new()
            .with_variant::<Label, _>("global", || Box::new("g"))
            .with_field_variant::<Label, _>("Zoo.keeper", "local", || Box::new("l"));

        let scoped = options.variants_for(Some("Zoo.keeper"));
        assert!(scoped.constructor::<Label>("local").is_some());
        assert!(scoped.constructor::<Label>("global").is_none());

        let other = options.variants_for(Some("Zoo.animals"));
        assert!(other.constructor::<Label>("global").is_some());
        assert!(options.variants_for(None).constructor::<Label>("local").is_none());
    }

    #[test]
    fn qualified_scope_wins_over_short_form() {
        let options = Options::new()
            .with_field_variant::<Label, _>("Zoo.keeper", "short", || Box::new("s"))
            .with_field_variant::<Label, _>("app::north::Zoo.keeper", "north", || {
                Box::new("n")
            });

        let north = options.variants_for(Some("app::north::Zoo.keeper"));
        assert!(north.constructor::<Label>("north").is_some());
        assert!(north.constructor::<Label>("short").is_none());

        let south = options.variants_for(Some("app::south::Zoo.keeper"));
        assert!(south.constructor::<Label>("short").is_some());
        assert!(south.constructor::<Label>("north").is_none());
    }
}
