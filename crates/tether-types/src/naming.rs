//! Default external keys for record fields.
//!
//! A field without an explicit name in its directive is exposed under its
//! own name rewritten to lowercase with `_` separators. A separator goes
//! before an uppercase letter that follows a lowercase letter, and before
//! the last uppercase letter of an acronym run when a lowercase letter
//! follows it:
//!
//! - `userName` → `user_name`
//! - `HTTPServer` → `http_server`
//! - `userID` → `user_id`
//! - `retry_limit` → `retry_limit`

/// Compute the default external key for a field name.
pub fn external_name(field: &str) -> String {
    let chars: Vec<char> = field.chars().collect();
    let mut out = String::with_capacity(field.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 && !out.ends_with('_') {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_lowercase();
            let acronym_end = prev.is_uppercase() && next.is_some_and(char::is_lowercase);
            if after_lower || acronym_end {
                out.push('_');
            }
        }
        out.extend(ch.to_lowercase());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn camel_case() {
        assert_eq!(external_name("userName"), "user_name");
        assert_eq!(external_name("maxRetryCount"), "max_retry_count");
    }

    #[test]
    fn pascal_case() {
        assert_eq!(external_name("ListenAddress"), "listen_address");
    }

    #[test]
    fn acronym_boundaries() {
        assert_eq!(external_name("HTTPServer"), "http_server");
        assert_eq!(external_name("userID"), "user_id");
        assert_eq!(external_name("ID"), "id");
        assert_eq!(external_name("parseJSONBody"), "parse_json_body");
    }

    #[test]
    fn snake_case_is_unchanged() {
        assert_eq!(external_name("retry_limit"), "retry_limit");
        assert_eq!(external_name("port"), "port");
    }

    #[test]
    fn no_double_separator() {
        assert_eq!(external_name("user_Name"), "user_name");
    }

    proptest! {
        #[test]
        fn snake_identifiers_map_to_themselves(name in "[a-z][a-z0-9_]{0,24}") {
            prop_assert_eq!(external_name(&name), name);
        }

        #[test]
        fn output_is_lowercase_and_stable(name in "[A-Za-z][A-Za-z0-9]{0,24}") {
            let once = external_name(&name);
            prop_assert!(!once.chars().any(char::is_uppercase));
            prop_assert_eq!(external_name(&once), once.clone());
        }
    }
}
