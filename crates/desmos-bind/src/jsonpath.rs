//! Dotted-path presence checks over JSON text.
//!
//! Supports:
//! - `a.b.c` (object keys)
//! - `items.0.name` (numeric segments index arrays)
//! - `a\.b` (escaped dot inside a key)
//!
//! Does NOT support wildcards, queries or modifiers. Binding only asks
//! whether a value is present; extraction happens in the full-document decode.

use serde_json::Value;

/// Splits a dotted path into keys, honoring `\` escapes.
///
/// ```rust
/// use desmos_bind::jsonpath::split_path;
///
/// assert_eq!(split_path("user.age"), vec!["user", "age"]);
/// assert_eq!(split_path(r"meta.a\.b"), vec!["meta", "a.b"]);
/// ```
pub fn split_path(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '.' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Follows `path` from `value`.
///
/// Returns `None` for an empty path; the document root is not a field.
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return None;
    }

    split_path(path)
        .iter()
        .try_fold(value, |current, key| match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => items.get(key.parse::<usize>().ok()?),
            _ => None,
        })
}

/// Returns true if `path` resolves to a value (including `null`) in
/// `json_text`. Text that is not valid JSON contains nothing.
///
/// ```rust
/// use desmos_bind::jsonpath::exists;
///
/// assert!(exists(r#"{"user":{"age":30}}"#, "user.age"));
/// assert!(!exists(r#"{"user":{}}"#, "user.age"));
/// ```
pub fn exists(json_text: &str, path: &str) -> bool {
    serde_json::from_str::<Value>(json_text)
        .ok()
        .is_some_and(|doc| lookup(&doc, path).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_keys() {
        let doc = json!({"a": {"b": {"c": 1}}});
        assert_eq!(lookup(&doc, "a.b.c"), Some(&json!(1)));
        assert_eq!(lookup(&doc, "a.b.d"), None);
    }

    #[test]
    fn test_array_index() {
        let doc = json!({"items": [{"name": "x"}, {"name": "y"}]});
        assert_eq!(lookup(&doc, "items.1.name"), Some(&json!("y")));
        assert_eq!(lookup(&doc, "items.2.name"), None);
        assert_eq!(lookup(&doc, "items.first"), None);
    }

    #[test]
    fn test_null_counts_as_present() {
        assert!(exists(r#"{"deleted_at": null}"#, "deleted_at"));
    }

    #[test]
    fn test_scalar_has_no_children() {
        assert!(!exists(r#"{"a": 5}"#, "a.b"));
    }

    #[test]
    fn test_escaped_dot() {
        let doc = json!({"a.b": true});
        assert_eq!(lookup(&doc, r"a\.b"), Some(&json!(true)));
        assert_eq!(lookup(&doc, "a.b"), None);
    }

    #[test]
    fn test_invalid_json() {
        assert!(!exists("{not json", "a"));
        assert!(!exists("", "a"));
    }

    #[test]
    fn test_empty_path() {
        assert!(!exists("{}", ""));
    }
}
