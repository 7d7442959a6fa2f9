//! The [`Bindable`] capability and its built-in implementations.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::path::PathBuf;
use std::time::Duration;

use tether_types::{format_duration, parse_duration, RawMap, Value};

use crate::coerce::{self, MapKey, Numeric};
use crate::context::{Context, Mode};
use crate::error::{BindError, BindResult};
use crate::graph::LinkVisitor;
use crate::record::Record;
use crate::walker::{bind_slot, unbind_slot};

/// Upcast helper so trait objects can reach [`Any`].
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A value that converts to and from raw form.
///
/// Implementations exist for scalars, strings, durations, paths, options,
/// boxes, sequences and typed mappings. Records get theirs from
/// [`impl_record!`](crate::impl_record). Field slots are always reached
/// through [`bind_slot`] / [`unbind_slot`] so that custom converters take
/// precedence over these implementations.
pub trait Bindable: AsAny + Send + Sync {
    /// Replace (or, in merge mode, update) the value from `raw`.
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()>;

    /// Raw form of the value, or `None` to omit it from the output.
    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>>;

    /// Reset to the zero value.
    fn clear(&mut self);

    /// Report shared nodes and references to the linker.
    fn visit_links(&mut self, _visitor: &mut dyn LinkVisitor) {}

    fn as_record(&self) -> Option<&dyn Record> {
        None
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        None
    }

    /// Type name used in diagnostics.
    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

macro_rules! impl_bindable_number {
    ($($ty:ty),* $(,)?) => {$(
        impl Bindable for $ty {
            fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
                if raw.is_null() {
                    self.clear();
                    return Ok(());
                }
                *self = coerce::to_number::<$ty>(raw)
                    .ok_or_else(|| cx.type_mismatch(stringify!($ty), raw))?;
                Ok(())
            }

            fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
                self.to_raw().map(Some).ok_or_else(|| {
                    BindError::Unsupported(format!(
                        "non-finite {} {} at {}",
                        stringify!($ty),
                        self,
                        cx.path()
                    ))
                })
            }

            fn clear(&mut self) {
                *self = <$ty>::default();
            }
        }
    )*};
}

impl_bindable_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl Bindable for bool {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        if raw.is_null() {
            self.clear();
            return Ok(());
        }
        *self = coerce::to_bool(raw).ok_or_else(|| cx.type_mismatch("bool", raw))?;
        Ok(())
    }

    fn unbind_value(&self, _cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        Ok(Some(Value::Bool(*self)))
    }

    fn clear(&mut self) {
        *self = false;
    }
}

impl Bindable for String {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        if raw.is_null() {
            self.clear();
            return Ok(());
        }
        *self = coerce::to_text(raw).ok_or_else(|| cx.type_mismatch("string", raw))?;
        Ok(())
    }

    fn unbind_value(&self, _cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        Ok(Some(Value::String(self.clone())))
    }

    fn clear(&mut self) {
        String::clear(self);
    }
}

impl Bindable for PathBuf {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        match raw {
            Value::Null => self.clear(),
            Value::String(s) => *self = PathBuf::from(s),
            other => return Err(cx.type_mismatch("path string", other)),
        }
        Ok(())
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        let text = self.to_str().ok_or_else(|| {
            BindError::Unsupported(format!("non UTF-8 path {} at {}", self.display(), cx.path()))
        })?;
        Ok(Some(Value::String(text.to_string())))
    }

    fn clear(&mut self) {
        *self = PathBuf::new();
    }
}

impl Bindable for Duration {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        match raw {
            Value::Null => self.clear(),
            Value::String(s) => {
                *self = parse_duration(s).map_err(|e| cx.conversion("Duration", e))?;
            }
            Value::Number(_) => {
                let nanos = coerce::to_number::<u64>(raw)
                    .ok_or_else(|| cx.type_mismatch("duration", raw))?;
                *self = Duration::from_nanos(nanos);
            }
            other => return Err(cx.type_mismatch("duration string", other)),
        }
        Ok(())
    }

    fn unbind_value(&self, _cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        Ok(Some(Value::String(format_duration(*self))))
    }

    fn clear(&mut self) {
        *self = Duration::ZERO;
    }
}

/// Raw values pass through untouched. `null` is omitted on unbind.
impl Bindable for Value {
    fn bind_value(&mut self, raw: &Value, _cx: &mut Context<'_>) -> BindResult<()> {
        *self = raw.clone();
        Ok(())
    }

    fn unbind_value(&self, _cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        Ok((!self.is_null()).then(|| self.clone()))
    }

    fn clear(&mut self) {
        *self = Value::Null;
    }
}

impl Bindable for RawMap {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        match raw {
            Value::Null => self.clear(),
            Value::Object(map) => *self = map.clone(),
            other => return Err(cx.type_mismatch("mapping", other)),
        }
        Ok(())
    }

    fn unbind_value(&self, _cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        Ok(Some(Value::Object(self.clone())))
    }

    fn clear(&mut self) {
        RawMap::clear(self);
    }
}

impl<T: Bindable + Default> Bindable for Option<T> {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        if raw.is_null() {
            *self = None;
            return Ok(());
        }
        if let (Some(inner), Mode::Merge) = (self.as_mut(), cx.mode()) {
            return bind_slot(inner, raw, cx);
        }
        let mut fresh = T::default();
        bind_slot(&mut fresh, raw, cx)?;
        *self = Some(fresh);
        Ok(())
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        match self {
            Some(inner) => unbind_slot(inner, cx),
            None => Ok(None),
        }
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn visit_links(&mut self, visitor: &mut dyn LinkVisitor) {
        if let Some(inner) = self {
            inner.visit_links(visitor);
        }
    }
}

impl<T: Bindable> Bindable for Box<T> {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        bind_slot(self.as_mut(), raw, cx)
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        unbind_slot(self.as_ref(), cx)
    }

    fn clear(&mut self) {
        self.as_mut().clear();
    }

    fn visit_links(&mut self, visitor: &mut dyn LinkVisitor) {
        self.as_mut().visit_links(visitor);
    }

    fn as_record(&self) -> Option<&dyn Record> {
        self.as_ref().as_record()
    }

    fn as_record_mut(&mut self) -> Option<&mut dyn Record> {
        self.as_mut().as_record_mut()
    }
}

/// Sequences are replaced wholesale; elements are bound independently.
impl<T: Bindable + Default> Bindable for Vec<T> {
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        let items = match raw {
            Value::Null => {
                self.clear();
                return Ok(());
            }
            Value::Array(items) => items,
            other => return Err(cx.type_mismatch("sequence", other)),
        };
        let mut out = Vec::with_capacity(items.len());
        cx.with_mode(Mode::Bind, |cx| {
            for (index, item) in items.iter().enumerate() {
                let mut element = T::default();
                cx.with_key(index, |cx| bind_slot(&mut element, item, cx))?;
                out.push(element);
            }
            Ok::<_, BindError>(())
        })?;
        *self = out;
        Ok(())
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        let mut out = Vec::with_capacity(self.len());
        for (index, element) in self.iter().enumerate() {
            // Absent elements keep their position as explicit nulls.
            let raw = cx.with_key(index, |cx| unbind_slot(element, cx))?;
            out.push(raw.unwrap_or(Value::Null));
        }
        Ok(Some(Value::Array(out)))
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn visit_links(&mut self, visitor: &mut dyn LinkVisitor) {
        for element in self.iter_mut() {
            element.visit_links(visitor);
        }
    }
}

fn bind_entries<K, V>(
    raw: &Value,
    cx: &mut Context<'_>,
    mut insert: impl FnMut(K, V),
) -> BindResult<bool>
where
    K: MapKey,
    V: Bindable + Default,
{
    let map = match raw {
        Value::Null => return Ok(false),
        Value::Object(map) => map,
        other => return Err(cx.type_mismatch("mapping", other)),
    };
    cx.with_mode(Mode::Bind, |cx| {
        for (key, item) in map {
            let typed_key = K::from_key(key).ok_or_else(|| BindError::TypeMismatch {
                path: cx.path(),
                expected: format!("{} key", std::any::type_name::<K>()),
                found: format!("key {key:?}"),
            })?;
            let mut value = V::default();
            cx.with_key(key, |cx| bind_slot(&mut value, item, cx))?;
            insert(typed_key, value);
        }
        Ok(true)
    })
}

fn unbind_entries<'a, K, V>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    cx: &mut Context<'_>,
) -> BindResult<RawMap>
where
    K: MapKey + 'a,
    V: Bindable + 'a,
{
    let mut out = RawMap::new();
    for (key, value) in entries {
        let key = key.to_key();
        if let Some(raw) = cx.with_key(&key, |cx| unbind_slot(value, cx))? {
            out.insert(key, raw);
        }
    }
    Ok(out)
}

/// Typed mappings are replaced wholesale. Keys are parsed from the raw
/// string keys and rendered back to strings on unbind, sorted for stable
/// output.
impl<K, V> Bindable for HashMap<K, V>
where
    K: MapKey + Eq + Hash,
    V: Bindable + Default,
{
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        let mut out: HashMap<K, V> = HashMap::new();
        if bind_entries(raw, cx, |k, v| {
            out.insert(k, v);
        })? {
            *self = out;
        } else {
            self.clear();
        }
        Ok(())
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        let mut entries: Vec<(&K, &V)> = self.iter().collect();
        entries.sort_by_cached_key(|(k, _)| k.to_key());
        unbind_entries(entries.into_iter(), cx).map(|m| Some(Value::Object(m)))
    }

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn visit_links(&mut self, visitor: &mut dyn LinkVisitor) {
        for value in self.values_mut() {
            value.visit_links(visitor);
        }
    }
}

impl<K, V> Bindable for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Bindable + Default,
{
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        let mut out: BTreeMap<K, V> = BTreeMap::new();
        if bind_entries(raw, cx, |k, v| {
            out.insert(k, v);
        })? {
            *self = out;
        } else {
            self.clear();
        }
        Ok(())
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        unbind_entries(self.iter(), cx).map(|m| Some(Value::Object(m)))
    }

    fn clear(&mut self) {
        BTreeMap::clear(self);
    }

    fn visit_links(&mut self, visitor: &mut dyn LinkVisitor) {
        for value in self.values_mut() {
            value.visit_links(visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use serde_json::json;

    fn bind_into<T: Bindable>(slot: &mut T, raw: Value) -> BindResult<()> {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Bind);
        bind_slot(slot, &raw, &mut cx)
    }

    fn unbind_from<T: Bindable>(slot: &T) -> Option<Value> {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Bind);
        unbind_slot(slot, &mut cx).unwrap()
    }

    #[test]
    fn scalars_coerce_from_strings() {
        let mut port = 0u16;
        bind_into(&mut port, json!("8080")).unwrap();
        assert_eq!(port, 8080);

        let mut flag = false;
        bind_into(&mut flag, json!("T")).unwrap();
        assert!(flag);

        let mut name = String::new();
        bind_into(&mut name, json!(42)).unwrap();
        assert_eq!(name, "42");
    }

    #[test]
    fn scalar_mismatch_names_expected_type() {
        let mut port = 0u16;
        let err = bind_into(&mut port, json!("eighty")).unwrap_err();
        match err {
            BindError::TypeMismatch { expected, found, .. } => {
                assert_eq!(expected, "u16");
                assert_eq!(found, "string");
            }
            other => panic!("unexpected error: {other}"),
        }
        let mut flag = false;
        assert!(bind_into(&mut flag, json!([true])).is_err());
    }

    #[test]
    fn null_resets_scalars() {
        let mut port = 99u16;
        bind_into(&mut port, Value::Null).unwrap();
        assert_eq!(port, 0);
    }

    #[test]
    fn durations_from_text_and_nanos() {
        let mut timeout = Duration::ZERO;
        bind_into(&mut timeout, json!("1m30s")).unwrap();
        assert_eq!(timeout, Duration::from_secs(90));
        assert_eq!(unbind_from(&timeout), Some(json!("1m30s")));

        bind_into(&mut timeout, json!(1_500_000)).unwrap();
        assert_eq!(timeout, Duration::from_micros(1_500));

        let err = bind_into(&mut timeout, json!("soon")).unwrap_err();
        assert!(matches!(err, BindError::Conversion { target: "Duration", .. }));
    }

    #[test]
    fn non_finite_float_cannot_unbind() {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Bind);
        let err = unbind_slot(&f64::INFINITY, &mut cx).unwrap_err();
        assert!(matches!(err, BindError::Unsupported(_)));
    }

    #[test]
    fn option_omits_none() {
        let mut value: Option<u32> = None;
        assert_eq!(unbind_from(&value), None);
        bind_into(&mut value, json!(3)).unwrap();
        assert_eq!(value, Some(3));
        bind_into(&mut value, Value::Null).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn sequence_elements_coerce_independently() {
        let mut ports: Vec<u16> = vec![1, 2, 3, 4];
        bind_into(&mut ports, json!([80, "443"])).unwrap();
        assert_eq!(ports, vec![80, 443]);

        let err = bind_into(&mut ports, json!([80, "x"])).unwrap_err();
        match err {
            BindError::TypeMismatch { path, .. } => assert_eq!(path, "1"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sequence_keeps_none_positions() {
        let values: Vec<Option<u8>> = vec![Some(1), None, Some(3)];
        assert_eq!(unbind_from(&values), Some(json!([1, null, 3])));
    }

    #[test]
    fn typed_keys_round_trip_through_strings() {
        let mut by_id: BTreeMap<u32, String> = BTreeMap::new();
        bind_into(&mut by_id, json!({"42": "answer", "7": "lucky"})).unwrap();
        assert_eq!(by_id.get(&42).map(String::as_str), Some("answer"));
        assert_eq!(unbind_from(&by_id), Some(json!({"7": "lucky", "42": "answer"})));
    }

    #[test]
    fn bad_typed_key_is_a_mismatch() {
        let mut by_id: HashMap<i64, bool> = HashMap::new();
        let err = bind_into(&mut by_id, json!({"one": true})).unwrap_err();
        assert!(matches!(err, BindError::TypeMismatch { .. }));
    }

    #[test]
    fn hash_map_unbinds_sorted() {
        let mut flags: HashMap<String, bool> = HashMap::new();
        flags.insert("zeta".into(), true);
        flags.insert("alpha".into(), false);
        let raw = unbind_from(&flags).unwrap();
        let keys: Vec<&str> = raw.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }

    #[test]
    fn raw_values_pass_through() {
        let mut raw = Value::Null;
        bind_into(&mut raw, json!({"any": ["thing", 1]})).unwrap();
        assert_eq!(raw, json!({"any": ["thing", 1]}));
        assert_eq!(unbind_from(&Value::Null), None);
    }

    #[test]
    fn paths_bind_from_strings() {
        let mut path = PathBuf::new();
        bind_into(&mut path, json!("/etc/tether.toml")).unwrap();
        assert_eq!(path, PathBuf::from("/etc/tether.toml"));
        assert!(bind_into(&mut path, json!(1)).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn integer_keys_render_back_to_their_string(keys in proptest::collection::btree_set(any::<i64>(), 0..16)) {
                let raw: RawMap = keys
                    .iter()
                    .map(|k| (k.to_string(), json!(true)))
                    .collect();
                let mut typed: BTreeMap<i64, bool> = BTreeMap::new();
                bind_into(&mut typed, Value::Object(raw)).unwrap();
                let back = unbind_from(&typed).unwrap();
                let rendered: Vec<String> = back.as_object().unwrap().keys().cloned().collect();
                let expected: Vec<String> = keys.iter().map(i64::to_string).collect();
                prop_assert_eq!(rendered, expected);
            }
        }
    }
}
