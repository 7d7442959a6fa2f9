//! Polymorphic fields selected by a discriminator.
//!
//! A field whose declared type is an open capability (a trait object) is
//! stored as [`Variant<dyn Capability>`]. Its raw form is a mapping carrying
//! a `"type"` key; the concrete variant is built by a constructor registered
//! under that discriminator in [`Variants`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tether_types::{RawMap, Value, DISCRIMINATOR_KEY};

use crate::bindable::Bindable;
use crate::context::{Context, Mode};
use crate::error::{BindError, BindResult};
use crate::graph::LinkVisitor;

/// A value that can sit behind a polymorphic field.
///
/// Capability traits extend this one:
///
/// ```ignore
/// trait Shape: Polymorphic {
///     fn area(&self) -> f64;
/// }
/// ```
pub trait Polymorphic: Bindable {
    /// Discriminator written under the `"type"` key.
    fn discriminator(&self) -> &str;
}

/// Builds an empty variant ready to be bound.
pub type Constructor<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

/// Registry of constructors, per capability type and discriminator.
#[derive(Clone, Default)]
pub struct Variants {
    by_capability: HashMap<TypeId, HashMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl Variants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for capability `T` under `discriminator`.
    ///
    /// ```ignore
    /// variants.register::<dyn Shape>("circle", || Box::new(Circle::default()));
    /// ```
    pub fn register<T, F>(&mut self, discriminator: impl Into<String>, constructor: F)
    where
        T: ?Sized + 'static,
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        let constructor: Constructor<T> = Arc::new(constructor);
        self.by_capability
            .entry(TypeId::of::<T>())
            .or_default()
            .insert(discriminator.into(), Arc::new(constructor));
    }

    /// The constructor registered for `T` under `discriminator`.
    pub fn constructor<T: ?Sized + 'static>(&self, discriminator: &str) -> Option<Constructor<T>> {
        self.by_capability
            .get(&TypeId::of::<T>())?
            .get(discriminator)?
            .downcast_ref::<Constructor<T>>()
            .cloned()
    }

    /// Whether anything is registered for capability `T`.
    pub fn has_capability<T: ?Sized + 'static>(&self) -> bool {
        self.by_capability.contains_key(&TypeId::of::<T>())
    }

    /// Registered discriminators for `T`, sorted.
    pub fn discriminators<T: ?Sized + 'static>(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .by_capability
            .get(&TypeId::of::<T>())
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        out.sort();
        out
    }
}

impl fmt::Debug for Variants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count: usize = self.by_capability.values().map(HashMap::len).sum();
        f.debug_struct("Variants")
            .field("capabilities", &self.by_capability.len())
            .field("constructors", &count)
            .finish()
    }
}

/// A polymorphic field holding at most one variant of capability `T`.
pub struct Variant<T: ?Sized>(Option<Box<T>>);

impl<T: ?Sized> Variant<T> {
    pub fn new(value: Box<T>) -> Self {
        Self(Some(value))
    }

    pub fn empty() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.0.as_deref_mut()
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    pub fn set(&mut self, value: Box<T>) {
        self.0 = Some(value);
    }

    pub fn take(&mut self) -> Option<Box<T>> {
        self.0.take()
    }
}

impl<T: ?Sized> Default for Variant<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T: ?Sized + Polymorphic> fmt::Debug for Variant<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => write!(f, "Variant({})", v.discriminator()),
            None => f.write_str("Variant(<empty>)"),
        }
    }
}

fn lookup<T: ?Sized + 'static>(cx: &Context<'_>, discriminator: &str) -> BindResult<Constructor<T>> {
    let options = cx.options();
    let registry = options.variants_for(cx.field_path());
    registry.constructor::<T>(discriminator).ok_or_else(|| {
        BindError::Unsupported(format!(
            "no variant of {} registered for discriminator {discriminator:?} at {}",
            std::any::type_name::<T>(),
            cx.path()
        ))
    })
}

impl<T: ?Sized + Polymorphic + 'static> Bindable for Variant<T> {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        let map = match raw {
            Value::Null => {
                self.0 = None;
                return Ok(());
            }
            Value::Object(map) => map,
            other => return Err(cx.type_mismatch("mapping with a \"type\" key", other)),
        };
        let discriminator = map
            .get(DISCRIMINATOR_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                BindError::Validation(format!(
                    "missing string {DISCRIMINATOR_KEY:?} discriminator at {}",
                    cx.path()
                ))
            })?;
        let body: RawMap = map
            .iter()
            .filter(|(k, _)| k.as_str() != DISCRIMINATOR_KEY)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let body = Value::Object(body);

        if cx.mode() == Mode::Merge {
            if let Some(existing) = self.0.as_deref_mut() {
                if existing.discriminator() == discriminator {
                    return existing.bind_value(&body, cx);
                }
            }
        }

        let constructor = lookup::<T>(cx, discriminator)?;
        let mut fresh = constructor();
        (*fresh).bind_value(&body, cx)?;
        self.0 = Some(fresh);
        Ok(())
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        let Some(value) = self.0.as_deref() else {
            return Ok(None);
        };
        let mut map = match value.unbind_value(cx)? {
            Some(Value::Object(map)) => map,
            None => RawMap::new(),
            Some(other) => {
                return Err(BindError::Unsupported(format!(
                    "polymorphic value {:?} unbound to a {} instead of a mapping",
                    value.discriminator(),
                    tether_types::kind_name(&other)
                )))
            }
        };
        map.insert(
            DISCRIMINATOR_KEY.to_string(),
            Value::String(value.discriminator().to_string()),
        );
        Ok(Some(Value::Object(map)))
    }

    fn clear(&mut self) {
        self.0 = None;
    }

    fn visit_links(&mut self, visitor: &mut dyn LinkVisitor) {
        if let Some(value) = self.0.as_deref_mut() {
            value.visit_links(visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Label = dyn fmt::Display + Send + Sync;

    #[test]
    fn constructors_are_scoped_by_capability() {
        let mut variants = Variants::new();
        variants.register::<Label, _>("five", || Box::new(5));
        variants.register::<Label, _>("word", || Box::new("hello"));

        let five = variants.constructor::<Label>("five").unwrap();
        assert_eq!(five().to_string(), "5");
        assert!(variants.constructor::<Label>("missing").is_none());
        assert!(variants.constructor::<dyn fmt::Debug + Send + Sync>("five").is_none());
        assert_eq!(variants.discriminators::<Label>(), vec!["five", "word"]);
        assert!(variants.has_capability::<Label>());
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut variants = Variants::new();
        variants.register::<Label, _>("n", || Box::new(1));
        variants.register::<Label, _>("n", || Box::new(2));
        assert_eq!(variants.constructor::<Label>("n").unwrap()().to_string(), "2");
    }

    #[test]
    fn empty_variant_defaults() {
        let variant: Variant<Label> = Variant::default();
        assert!(!variant.is_some());
        assert!(variant.get().is_none());
    }
}
