//! Caller-supplied conversions, consulted before any built-in rule.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tether_types::Value;

/// Boxed error returned by custom converters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

type FromRawFn = dyn Fn(&Value, &mut dyn Any) -> Result<(), BoxError> + Send + Sync;
type ToRawFn = dyn Fn(&dyn Any) -> Result<Value, BoxError> + Send + Sync;

/// A registered pair of conversions for one target type.
#[derive(Clone)]
pub struct Converter {
    type_name: &'static str,
    from_raw: Arc<FromRawFn>,
    to_raw: Arc<ToRawFn>,
}

impl Converter {
    /// Name of the target type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Convert `raw` and store it into `slot`.
    pub fn bind(&self, raw: &Value, slot: &mut dyn Any) -> Result<(), BoxError> {
        (self.from_raw)(raw, slot)
    }

    /// Convert the value in `slot` back to raw form.
    pub fn unbind(&self, slot: &dyn Any) -> Result<Value, BoxError> {
        (self.to_raw)(slot)
    }
}

/// Registry of custom converters keyed by exact target type.
///
/// ```
/// use tether_bind::Converters;
/// use serde_json::json;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Celsius(f64);
///
/// let mut converters = Converters::new();
/// converters.register::<Celsius, _, _, String>(
///     |raw| raw.as_f64().map(Celsius).ok_or_else(|| "expected degrees".to_string()),
///     |c| Ok(json!(c.0)),
/// );
/// assert!(converters.contains::<Celsius>());
/// ```
#[derive(Clone, Default)]
pub struct Converters {
    by_type: HashMap<TypeId, Converter>,
}

impl Converters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register conversions for `T`, replacing any previous pair.
    pub fn register<T, F, G, E>(&mut self, from_raw: F, to_raw: G)
    where
        T: Any,
        F: Fn(&Value) -> Result<T, E> + Send + Sync + 'static,
        G: Fn(&T) -> Result<Value, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let type_name = std::any::type_name::<T>();
        let converter = Converter {
            type_name,
            from_raw: Arc::new(move |raw: &Value, slot: &mut dyn Any| {
                let typed = from_raw(raw).map_err(Into::into)?;
                let target = slot
                    .downcast_mut::<T>()
                    .ok_or_else(|| format!("converter for {type_name} applied to another type"))?;
                *target = typed;
                Ok(())
            }),
            to_raw: Arc::new(move |slot: &dyn Any| {
                let typed = slot
                    .downcast_ref::<T>()
                    .ok_or_else(|| format!("converter for {type_name} applied to another type"))?;
                to_raw(typed).map_err(Into::into)
            }),
        };
        self.by_type.insert(TypeId::of::<T>(), converter);
    }

    /// Whether a converter is registered for `T`.
    pub fn contains<T: Any>(&self) -> bool {
        self.by_type.contains_key(&TypeId::of::<T>())
    }

    /// Look up the converter for a concrete type.
    pub fn get(&self, type_id: TypeId) -> Option<&Converter> {
        self.by_type.get(&type_id)
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl fmt::Debug for Converters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.by_type.values().map(|c| c.type_name).collect();
        names.sort_unstable();
        f.debug_struct("Converters").field("types", &names).finish()
    }
}
