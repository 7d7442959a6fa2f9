//! Built-in coercion rules between raw scalars and primitive types.
//!
//! Number-to-number conversion uses native `as` semantics: out-of-range
//! values saturate or truncate, they are not rejected. Strings are parsed
//! with the target type's standard parser.

use tether_types::Value;

/// Parse boolean text.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True`, `0`, `f`, `F`, `FALSE`,
/// `false`, `False`.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Coerce a raw value to a boolean.
pub fn to_bool(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool(s.trim()),
        _ => None,
    }
}

/// Coerce a raw scalar to text. Numbers and booleans are rendered.
pub fn to_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Primitive numbers reachable by coercion.
pub trait Numeric: Copy {
    fn from_i64(v: i64) -> Self;
    fn from_u64(v: u64) -> Self;
    fn from_f64(v: f64) -> Self;
    fn parse_text(text: &str) -> Option<Self>;
    /// Raw form of the value; `None` for non-finite floats.
    fn to_raw(self) -> Option<Value>;
}

macro_rules! impl_numeric {
    ($($ty:ty),* $(,)?) => {$(
        impl Numeric for $ty {
            fn from_i64(v: i64) -> Self {
                v as $ty
            }

            fn from_u64(v: u64) -> Self {
                v as $ty
            }

            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            fn parse_text(text: &str) -> Option<Self> {
                text.parse().ok()
            }

            fn to_raw(self) -> Option<Value> {
                Some(Value::from(self))
            }
        }
    )*};
}

impl_numeric!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($ty:ty),* $(,)?) => {$(
        impl Numeric for $ty {
            fn from_i64(v: i64) -> Self {
                v as $ty
            }

            fn from_u64(v: u64) -> Self {
                v as $ty
            }

            fn from_f64(v: f64) -> Self {
                v as $ty
            }

            fn parse_text(text: &str) -> Option<Self> {
                text.parse().ok()
            }

            fn to_raw(self) -> Option<Value> {
                serde_json::Number::from_f64(self as f64).map(Value::Number)
            }
        }
    )*};
}

impl_float!(f32, f64);

/// Coerce a raw value to a number of type `T`.
pub fn to_number<T: Numeric>(raw: &Value) -> Option<T> {
    match raw {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(T::from_i64(i))
            } else if let Some(u) = n.as_u64() {
                Some(T::from_u64(u))
            } else {
                n.as_f64().map(T::from_f64)
            }
        }
        Value::String(s) => T::parse_text(s.trim()),
        _ => None,
    }
}

/// Key type of a typed mapping.
///
/// Raw mappings are always string-keyed; keys are parsed with the same rules
/// as scalar values and rendered back to text on unbind.
pub trait MapKey: Sized + Send + Sync + 'static {
    fn from_key(key: &str) -> Option<Self>;
    fn to_key(&self) -> String;
}

impl MapKey for String {
    fn from_key(key: &str) -> Option<Self> {
        Some(key.to_string())
    }

    fn to_key(&self) -> String {
        self.clone()
    }
}

impl MapKey for bool {
    fn from_key(key: &str) -> Option<Self> {
        parse_bool(key.trim())
    }

    fn to_key(&self) -> String {
        self.to_string()
    }
}

macro_rules! impl_map_key {
    ($($ty:ty),* $(,)?) => {$(
        impl MapKey for $ty {
            fn from_key(key: &str) -> Option<Self> {
                key.trim().parse().ok()
            }

            fn to_key(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

impl_map_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bool_text_forms() {
        for t in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(t), Some(true), "{t}");
        }
        for f in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(f), Some(false), "{f}");
        }
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(to_bool(&json!(" true ")), Some(true));
        assert_eq!(to_bool(&json!(1)), None);
    }

    #[test]
    fn numeric_from_numbers() {
        assert_eq!(to_number::<u16>(&json!(8080)), Some(8080));
        assert_eq!(to_number::<f64>(&json!(3)), Some(3.0));
        assert_eq!(to_number::<i32>(&json!(2.9)), Some(2));
        assert_eq!(to_number::<u64>(&json!(u64::MAX)), Some(u64::MAX));
    }

    #[test]
    fn numeric_conversion_is_native() {
        // Out-of-range values follow `as` semantics.
        assert_eq!(to_number::<u8>(&json!(300)), Some(44));
        assert_eq!(to_number::<u8>(&json!(-1)), Some(255));
    }

    #[test]
    fn numeric_from_strings() {
        assert_eq!(to_number::<i64>(&json!("-42")), Some(-42));
        assert_eq!(to_number::<f32>(&json!("1.5")), Some(1.5));
        assert_eq!(to_number::<u8>(&json!("300")), None);
        assert_eq!(to_number::<i32>(&json!("4.2")), None);
        assert_eq!(to_number::<i32>(&json!(true)), None);
    }

    #[test]
    fn float_to_raw_rejects_nan() {
        assert_eq!(1.5f64.to_raw(), Some(json!(1.5)));
        assert_eq!(f64::NAN.to_raw(), None);
        assert_eq!(7u32.to_raw(), Some(json!(7)));
    }

    #[test]
    fn text_from_scalars() {
        assert_eq!(to_text(&json!("x")).as_deref(), Some("x"));
        assert_eq!(to_text(&json!(8)).as_deref(), Some("8"));
        assert_eq!(to_text(&json!([])), None);
    }

    #[test]
    fn map_keys() {
        assert_eq!(u32::from_key("42"), Some(42));
        assert_eq!(42u32.to_key(), "42");
        assert_eq!(i8::from_key("x"), None);
        assert_eq!(bool::from_key("T"), Some(true));
        assert_eq!(String::from_key("any"), Some("any".to_string()));
    }
}
