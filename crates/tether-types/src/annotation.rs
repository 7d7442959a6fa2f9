//! Field directive parsing.
//!
//! A directive is the short string attached to a record field that controls
//! how the field maps to raw data:
//!
//! ```text
//! [name][,+required][,+secret][,+extra][,+match=value|+match="value"]
//! ```
//!
//! A directive consisting of `-` alone excludes the field entirely. Unknown
//! tokens are ignored so older readers accept directives written for newer
//! ones.

use serde::{Deserialize, Serialize};

const SKIP: &str = "-";
const REQUIRED: &str = "+required";
const SECRET: &str = "+secret";
const EXTRA: &str = "+extra";
const MATCH_PREFIX: &str = "+match=";

/// Parsed form of a field directive.
///
/// When `skip` is set every other flag is left at its default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Override for the field's external key.
    pub name: Option<String>,
    /// The key must be present when binding.
    pub required: bool,
    /// The value is hidden from inspection views.
    pub secret: bool,
    /// The field is ignored by every operation.
    pub skip: bool,
    /// The bound value must render exactly as this text.
    pub fixed_value: Option<String>,
    /// The field collects keys no other field consumed.
    pub overflow: bool,
}

impl Annotation {
    /// Parse a directive string. Never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use tether_types::Annotation;
    ///
    /// let a = Annotation::parse("listen,+required,+match=\"tcp\"");
    /// assert_eq!(a.name.as_deref(), Some("listen"));
    /// assert!(a.required);
    /// assert_eq!(a.fixed_value.as_deref(), Some("tcp"));
    /// ```
    pub fn parse(directive: &str) -> Self {
        let directive = directive.trim();
        if directive == SKIP {
            return Self {
                skip: true,
                ..Self::default()
            };
        }

        let mut annotation = Self::default();
        for (index, token) in tokens(directive).into_iter().enumerate() {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if !token.starts_with('+') {
                // Only the leading token names the field.
                if index == 0 {
                    annotation.name = Some(token.to_string());
                }
                continue;
            }
            match token {
                REQUIRED => annotation.required = true,
                SECRET => annotation.secret = true,
                EXTRA => annotation.overflow = true,
                _ => {
                    if let Some(raw) = token.strip_prefix(MATCH_PREFIX) {
                        if let Some(value) = match_value(raw) {
                            annotation.fixed_value = Some(value);
                        }
                    }
                }
            }
        }
        annotation
    }

    /// The external key for a field, given its default name.
    pub fn key_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(default)
    }
}

/// Split on commas that are not inside double quotes.
fn tokens(directive: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, ch) in directive.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                out.push(&directive[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&directive[start..]);
    out
}

/// Value of a `+match=` token, or `None` when malformed.
fn match_value(raw: &str) -> Option<String> {
    if let Some(rest) = raw.strip_prefix('"') {
        let inner = rest.strip_suffix('"')?;
        if inner.contains('"') {
            return None;
        }
        return Some(inner.to_string());
    }
    if raw.is_empty() || raw.contains('"') {
        return None;
    }
    Some(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directive_is_default() {
        assert_eq!(Annotation::parse(""), Annotation::default());
    }

    #[test]
    fn dash_alone_skips() {
        let a = Annotation::parse("-");
        assert!(a.skip);
        assert!(a.name.is_none());
        assert!(!a.required);
    }

    #[test]
    fn dash_with_comma_is_a_name() {
        let a = Annotation::parse("-,");
        assert!(!a.skip);
        assert_eq!(a.name.as_deref(), Some("-"));
    }

    #[test]
    fn name_and_flags() {
        let a = Annotation::parse("api_key,+required,+secret");
        assert_eq!(a.name.as_deref(), Some("api_key"));
        assert!(a.required);
        assert!(a.secret);
        assert!(!a.overflow);
    }

    #[test]
    fn flags_without_name() {
        let a = Annotation::parse(",+extra");
        assert!(a.name.is_none());
        assert!(a.overflow);

        let b = Annotation::parse("+required");
        assert!(b.name.is_none());
        assert!(b.required);
    }

    #[test]
    fn only_first_token_names_the_field() {
        let a = Annotation::parse("first,second");
        assert_eq!(a.name.as_deref(), Some("first"));
    }

    #[test]
    fn match_quoted_and_unquoted() {
        assert_eq!(
            Annotation::parse("kind,+match=\"circle\"").fixed_value.as_deref(),
            Some("circle")
        );
        assert_eq!(
            Annotation::parse("kind,+match=square").fixed_value.as_deref(),
            Some("square")
        );
        assert_eq!(
            Annotation::parse("kind,+match=\"\"").fixed_value.as_deref(),
            Some("")
        );
    }

    #[test]
    fn match_with_comma_inside_quotes() {
        let a = Annotation::parse("pair,+match=\"a,b\",+required");
        assert_eq!(a.fixed_value.as_deref(), Some("a,b"));
        assert!(a.required);
    }

    #[test]
    fn malformed_match_is_ignored() {
        assert!(Annotation::parse("k,+match=\"open").fixed_value.is_none());
        assert!(Annotation::parse("k,+match=half\"").fixed_value.is_none());
        assert!(Annotation::parse("k,+match=").fixed_value.is_none());
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let a = Annotation::parse("port,+omitempty,+required,flow");
        assert_eq!(a.name.as_deref(), Some("port"));
        assert!(a.required);
    }

    #[test]
    fn whitespace_is_trimmed() {
        let a = Annotation::parse(" host , +required ");
        assert_eq!(a.name.as_deref(), Some("host"));
        assert!(a.required);
    }

    #[test]
    fn key_or_falls_back() {
        assert_eq!(Annotation::parse("").key_or("port"), "port");
        assert_eq!(Annotation::parse("p").key_or("port"), "p");
    }
}
