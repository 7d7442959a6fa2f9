//! Raw values exchanged with external decoders.
//!
//! The raw representation is `serde_json::Value` built with the
//! `preserve_order` feature, so mappings keep the order in which keys were
//! decoded and an unbound record reproduces its input layout.

pub use serde_json::Value;

/// A raw mapping from string keys to raw values.
pub type RawMap = serde_json::Map<String, Value>;

/// Reserved key carrying a polymorphic value's discriminator.
pub const DISCRIMINATOR_KEY: &str = "type";

/// Reserved key of the single-key mapping that encodes a reference.
pub const REF_KEY: &str = "$ref";

/// Short shape name of a raw value, used in mismatch messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Render a scalar as plain text.
///
/// Strings are returned without quotes. Returns `None` for sequences and
/// mappings.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}
