//! Dotted key paths into nested mappings.
//!
//! `"a.b.c"` addresses `map["a"]["b"]["c"]`. The separator is configurable;
//! an empty separator makes the whole path a single key.

use serde_json::{Map, Value};

/// Default separator between path elements.
pub const DEFAULT_PATH_SEPARATOR: &str = ".";

/// Look up the value stored at `path`.
///
/// Returns `None` as soon as an element is missing, or when a path element
/// remains but the value reached so far is not a mapping.
pub fn resolve_path<'a>(map: &'a Map<String, Value>, path: &str, separator: &str) -> Option<&'a Value> {
    let split = if separator.is_empty() {
        None
    } else {
        path.split_once(separator)
    };

    match split {
        None => map.get(path),
        Some((head, rest)) => match map.get(head)? {
            Value::Object(nested) => resolve_path(nested, rest, separator),
            _ => None,
        },
    }
}

/// Tests if `path` is a valid key path inside `map`.
///
/// ```
/// use collectiontools::contains_path;
/// use serde_json::json;
///
/// let value = json!({"a": {"b": 1}});
/// let map = value.as_object().unwrap();
/// assert!(contains_path(map, "a.b", "."));
/// assert!(!contains_path(map, "a.c", "."));
/// assert!(!contains_path(map, "a.b.c", "."));
/// ```
pub fn contains_path(map: &Map<String, Value>, path: &str, separator: &str) -> bool {
    resolve_path(map, path, separator).is_some()
}
