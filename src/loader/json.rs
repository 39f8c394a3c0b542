use crate::error::{LoadError, LoadResult};
use crate::loader::policy::ErrorPolicy;
use crate::loader::source::{FileSource, TextSource};
use crate::path::{DEFAULT_PATH_SEPARATOR, contains_path};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Options for loading JSON documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Key paths that must resolve in the document, e.g. `"database.url"`
    pub mandatory_keys: Vec<String>,
    /// Separator between the elements of a key path
    pub path_separator: String,
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions {
            mandatory_keys: Vec::new(),
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
        }
    }
}

impl JsonOptions {
    pub fn with_mandatory_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        JsonOptions {
            mandatory_keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// Parse `text` as a JSON document whose root is an object.
pub fn parse_json_object(text: &str, location: &str) -> LoadResult<Map<String, Value>> {
    let json: Value = serde_json::from_str(text).map_err(|e| LoadError::Parse {
        location: location.to_string(),
        reason: e.to_string(),
    })?;

    match json {
        Value::Object(map) => Ok(map),
        _ => Err(LoadError::NotAnObject {
            location: location.to_string(),
        }),
    }
}

/// Fail with the first mandatory key path that does not resolve in `document`.
pub fn check_mandatory_keys(
    document: &Map<String, Value>,
    options: &JsonOptions,
    location: &str,
) -> LoadResult<()> {
    let missing = options
        .mandatory_keys
        .iter()
        .find(|key| !contains_path(document, key, &options.path_separator));

    match missing {
        Some(key) => Err(LoadError::MissingKey {
            location: location.to_string(),
            key: key.clone(),
        }),
        None => Ok(()),
    }
}

/// Read a JSON object from `source` and merge its top-level keys into `dest`.
///
/// `dest` is only changed when the document parses and every mandatory key
/// path resolves; existing keys with the same name are overwritten. Returns
/// `Ok(true)` on success; failures are handled according to `policy`.
pub async fn update_from_json<S>(
    dest: &mut Map<String, Value>,
    source: &S,
    options: &JsonOptions,
    policy: ErrorPolicy<'_>,
) -> LoadResult<bool>
where
    S: TextSource + ?Sized,
{
    let outcome = load_json(dest, source, options).await;
    policy.settle(outcome)
}

async fn load_json<S>(dest: &mut Map<String, Value>, source: &S, options: &JsonOptions) -> LoadResult<()>
where
    S: TextSource + ?Sized,
{
    let location = source.describe();
    let text = source.fetch_text().await?;
    let document = parse_json_object(&text, &location)?;
    check_mandatory_keys(&document, options, &location)?;

    tracing::debug!(source = %location, keys = document.len(), "merging JSON document");
    dest.extend(document);
    Ok(())
}

/// Read a JSON object from the file at `path` and merge it into `dest`.
pub async fn update_from_json_file(
    dest: &mut Map<String, Value>,
    path: impl AsRef<Path>,
    options: &JsonOptions,
    policy: ErrorPolicy<'_>,
) -> LoadResult<bool> {
    let source = FileSource::new(path.as_ref());
    update_from_json(dest, &source, options, policy).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::source::InlineSource;
    use serde_json::json;

    fn existing() -> Map<String, Value> {
        match json!({"abc": "old", "other": 1}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_merge_overwrites_top_level_keys() {
        let mut dest = existing();
        let source = InlineSource::new("data.json", r#"{"abc": {"new": true}, "test": {"x": {"y": 1}}}"#);
        let options = JsonOptions::with_mandatory_keys(["abc", "test.x.y"]);

        let loaded = update_from_json(&mut dest, &source, &options, ErrorPolicy::reraise())
            .await
            .unwrap();

        assert!(loaded);
        assert_eq!(
            Value::Object(dest),
            json!({"abc": {"new": true}, "other": 1, "test": {"x": {"y": 1}}})
        );
    }

    #[tokio::test]
    async fn test_missing_mandatory_key_leaves_dest_untouched() {
        let mut dest = existing();
        let source = InlineSource::new("data.json", r#"{"a": {"c": 1}, "z": 2}"#);
        let options = JsonOptions::with_mandatory_keys(["a.b"]);
        let mut sink = Vec::new();

        let loaded = update_from_json(&mut dest, &source, &options, ErrorPolicy::report_to(&mut sink))
            .await
            .unwrap();

        assert!(!loaded);
        assert_eq!(dest, existing());
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "Missing key 'a.b' in 'data.json'\n"
        );
    }

    #[tokio::test]
    async fn test_missing_mandatory_key_reraised() {
        let mut dest = existing();
        let source = InlineSource::new("data.json", r#"{"a": 1}"#);
        let options = JsonOptions::with_mandatory_keys(["a", "a.b"]);

        let result = update_from_json(&mut dest, &source, &options, ErrorPolicy::reraise()).await;

        assert_eq!(
            result,
            Err(LoadError::MissingKey {
                location: "data.json".to_string(),
                key: "a.b".to_string(),
            })
        );
        assert_eq!(dest, existing());
    }

    #[tokio::test]
    async fn test_invalid_json_and_non_object_root() {
        let mut dest = existing();

        let broken = InlineSource::new("broken.json", "{ not json");
        let result =
            update_from_json(&mut dest, &broken, &JsonOptions::default(), ErrorPolicy::reraise()).await;
        assert!(matches!(result, Err(LoadError::Parse { .. })));

        let list = InlineSource::new("list.json", "[1, 2]");
        let result =
            update_from_json(&mut dest, &list, &JsonOptions::default(), ErrorPolicy::default()).await;
        assert_eq!(result, Ok(false));
        assert_eq!(dest, existing());
    }

    #[test]
    fn test_custom_path_separator() {
        let document = parse_json_object(r#"{"a": {"b": 1}}"#, "inline").unwrap();
        let options = JsonOptions {
            mandatory_keys: vec!["a/b".to_string()],
            path_separator: "/".to_string(),
        };
        assert!(check_mandatory_keys(&document, &options, "inline").is_ok());
    }

    #[tokio::test]
    async fn test_update_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"server": {"port": 8080}}"#).unwrap();
        let mut dest = Map::new();

        let loaded = update_from_json_file(
            &mut dest,
            &path,
            &JsonOptions::with_mandatory_keys(["server.port"]),
            ErrorPolicy::reraise(),
        )
        .await
        .unwrap();

        assert!(loaded);
        assert_eq!(Value::Object(dest), json!({"server": {"port": 8080}}));
    }
}
