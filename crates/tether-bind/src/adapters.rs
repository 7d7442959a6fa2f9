//! Fields that convert themselves.
//!
//! [`Json`] hands the raw value to the wrapped type's serde implementation;
//! [`Text`] goes through `FromStr` and `Display`. Either can be overridden
//! by a converter registered for the wrapper type.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tether_types::Value;

use crate::bindable::Bindable;
use crate::coerce;
use crate::context::Context;
use crate::error::BindResult;

/// A field converted through its own `Serialize`/`Deserialize` impls.
///
/// Merge replaces the value wholesale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> From<T> for Json<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Bindable for Json<T>
where
    T: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        if raw.is_null() {
            self.clear();
            return Ok(());
        }
        self.0 = serde_json::from_value(raw.clone())
            .map_err(|e| cx.conversion(std::any::type_name::<T>(), e))?;
        Ok(())
    }

    fn unbind_value(&self, cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        let raw = serde_json::to_value(&self.0)
            .map_err(|e| cx.conversion(std::any::type_name::<T>(), e))?;
        Ok((!raw.is_null()).then_some(raw))
    }

    fn clear(&mut self) {
        self.0 = T::default();
    }
}

/// A field converted through `FromStr` and `Display`.
///
/// Any scalar is accepted on bind and rendered to text first, so `Text<u8>`
/// binds from `7` as well as from `"7"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Text<T>(pub T);

impl<T> Text<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Text<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Text<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T> From<T> for Text<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> Bindable for Text<T>
where
    T: FromStr + fmt::Display + Default + Send + Sync + 'static,
    T::Err: fmt::Display,
{
    fn bind_value(&mut self, raw: &Value, cx: &mut Context<'_>) -> BindResult<()> {
        if raw.is_null() {
            self.clear();
            return Ok(());
        }
        let text = coerce::to_text(raw).ok_or_else(|| cx.type_mismatch("text", raw))?;
        self.0 = text
            .parse()
            .map_err(|e: T::Err| cx.conversion(std::any::type_name::<T>(), e.to_string()))?;
        Ok(())
    }

    fn unbind_value(&self, _cx: &mut Context<'_>) -> BindResult<Option<Value>> {
        Ok(Some(Value::String(self.0.to_string())))
    }

    fn clear(&mut self) {
        self.0 = T::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Mode;
    use crate::error::BindError;
    use crate::options::Options;
    use crate::walker::{bind_slot, unbind_slot};
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq)]
    enum Level {
        #[default]
        Info,
        Warn,
    }

    impl FromStr for Level {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "info" => Ok(Level::Info),
                "warn" => Ok(Level::Warn),
                other => Err(format!("unknown level {other:?}")),
            }
        }
    }

    impl fmt::Display for Level {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Level::Info => "info",
                Level::Warn => "warn",
            })
        }
    }

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Window {
        start: u32,
        end: u32,
    }

    #[test]
    fn json_uses_serde() {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Bind);
        let mut window: Json<Window> = Json::default();
        bind_slot(&mut window, &json!({"start": 1, "end": 9}), &mut cx).unwrap();
        assert_eq!(window.end, 9);
        assert_eq!(
            unbind_slot(&window, &mut cx).unwrap(),
            Some(json!({"start": 1, "end": 9}))
        );
    }

    #[test]
    fn json_failure_is_a_conversion_error() {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Bind);
        let mut window: Json<Window> = Json::default();
        let err = bind_slot(&mut window, &json!({"start": "soon"}), &mut cx).unwrap_err();
        assert!(matches!(err, BindError::Conversion { .. }));
    }

    #[test]
    fn text_uses_from_str() {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Bind);
        let mut level: Text<Level> = Text::default();
        bind_slot(&mut level, &json!("warn"), &mut cx).unwrap();
        assert_eq!(*level, Level::Warn);
        assert_eq!(unbind_slot(&level, &mut cx).unwrap(), Some(json!("warn")));

        let err = bind_slot(&mut level, &json!("loud"), &mut cx).unwrap_err();
        assert!(matches!(err, BindError::Conversion { .. }));
    }

    #[test]
    fn text_accepts_numbers() {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Bind);
        let mut n: Text<u8> = Text::default();
        bind_slot(&mut n, &json!(7), &mut cx).unwrap();
        assert_eq!(n.into_inner(), 7);
    }
}
