//! Per-call state threaded through a bind, unbind, or merge.

use serde::{Deserialize, Serialize};
use tether_types::{kind_name, Value};

use crate::error::BindError;
use crate::options::Options;

/// How a mapping is applied to an existing value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Absent keys reset their field to its zero value.
    Bind,
    /// Absent keys leave their field untouched.
    Merge,
}

/// Settings for the human-readable inspection view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectOptions {
    /// Include `+secret` fields in the view.
    pub show_secrets: bool,
}

impl InspectOptions {
    /// A view that includes secret fields.
    pub fn revealing() -> Self {
        Self { show_secrets: true }
    }
}

/// Traversal state: options, current mode, and where we are.
pub struct Context<'o> {
    options: &'o Options,
    mode: Mode,
    inspect: Option<InspectOptions>,
    keys: Vec<String>,
    fields: Vec<String>,
}

impl<'o> Context<'o> {
    /// Start a traversal in the given mode.
    pub fn new(options: &'o Options, mode: Mode) -> Self {
        Self {
            options,
            mode,
            inspect: None,
            keys: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Start an inspection traversal.
    pub fn inspecting(options: &'o Options, inspect: InspectOptions) -> Self {
        Self {
            inspect: Some(inspect),
            ..Self::new(options, Mode::Bind)
        }
    }

    pub fn options(&self) -> &'o Options {
        self.options
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether `+secret` fields must be left out of the output.
    pub fn hides_secrets(&self) -> bool {
        self.inspect.is_some_and(|i| !i.show_secrets)
    }

    /// Dotted path of external keys from the root, e.g. `servers.1.port`.
    pub fn path(&self) -> String {
        if self.keys.is_empty() {
            "<root>".to_string()
        } else {
            self.keys.join(".")
        }
    }

    /// Scope (`module::Record.field`) of the innermost declared field being
    /// processed.
    pub fn field_path(&self) -> Option<&str> {
        self.fields.last().map(String::as_str)
    }

    /// Run `f` one key deeper.
    pub fn with_key<R>(&mut self, key: impl ToString, f: impl FnOnce(&mut Self) -> R) -> R {
        self.keys.push(key.to_string());
        let out = f(self);
        self.keys.pop();
        out
    }

    /// Run `f` in another mode, restoring the current one afterwards.
    pub fn with_mode<R>(&mut self, mode: Mode, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = std::mem::replace(&mut self.mode, mode);
        let out = f(self);
        self.mode = saved;
        out
    }

    pub(crate) fn with_field<R>(&mut self, field: String, f: impl FnOnce(&mut Self) -> R) -> R {
        self.fields.push(field);
        let out = f(self);
        self.fields.pop();
        out
    }

    /// A [`BindError::TypeMismatch`] at the current path.
    pub fn type_mismatch(&self, expected: impl Into<String>, found: &Value) -> BindError {
        BindError::TypeMismatch {
            path: self.path(),
            expected: expected.into(),
            found: kind_name(found).to_string(),
        }
    }

    /// A [`BindError::Conversion`] at the current path.
    pub fn conversion(
        &self,
        target: &'static str,
        source: impl Into<crate::convert::BoxError>,
    ) -> BindError {
        BindError::Conversion {
            path: self.path(),
            target,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_tracks_nesting() {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Bind);
        assert_eq!(cx.path(), "<root>");
        cx.with_key("servers", |cx| {
            cx.with_key(1, |cx| {
                assert_eq!(cx.path(), "servers.1");
            });
        });
        assert_eq!(cx.path(), "<root>");
    }

    #[test]
    fn with_mode_restores() {
        let options = Options::default();
        let mut cx = Context::new(&options, Mode::Merge);
        cx.with_mode(Mode::Bind, |cx| assert_eq!(cx.mode(), Mode::Bind));
        assert_eq!(cx.mode(), Mode::Merge);
    }

    #[test]
    fn secrets_hidden_only_when_inspecting() {
        let options = Options::default();
        assert!(!Context::new(&options, Mode::Bind).hides_secrets());
        assert!(Context::inspecting(&options, InspectOptions::default()).hides_secrets());
        assert!(!Context::inspecting(&options, InspectOptions::revealing()).hides_secrets());
    }
}
