//! Line oriented `KEY=VALUE` loaders
//!
//! ```text
//! NAME=Miller
//! GREETING = Hello {NAME}
//! this line has no separator and is skipped
//! URL=https://example.org/?a=b
//! ```
//!
//! Only the first separator splits a line, so `URL` above maps to
//! `https://example.org/?a=b`. Later lines overwrite earlier ones.

use crate::error::{LoadError, LoadResult};
use crate::loader::policy::ErrorPolicy;
use crate::loader::source::{FileSource, TextSource, UrlSource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Options for parsing key-value lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyValueOptions {
    /// String between key and value
    pub separator: String,
    /// Trim whitespace around keys and values
    pub strip: bool,
}

impl Default for KeyValueOptions {
    fn default() -> Self {
        KeyValueOptions {
            separator: "=".to_string(),
            strip: true,
        }
    }
}

/// Insert every `key<separator>value` line of `text` into `dest` as a string
/// value and return how many lines were applied.
pub fn apply_key_value_lines(
    dest: &mut Map<String, Value>,
    text: &str,
    options: &KeyValueOptions,
) -> LoadResult<usize> {
    if options.separator.is_empty() {
        return Err(LoadError::InvalidSeparator);
    }

    let mut applied = 0;
    for (number, line) in text.lines().enumerate() {
        let Some((key, value)) = line.split_once(options.separator.as_str()) else {
            tracing::trace!(line = number + 1, "no separator, skipping line");
            continue;
        };

        let (key, value) = if options.strip {
            (key.trim(), value.trim())
        } else {
            (key, value)
        };
        dest.insert(key.to_string(), Value::String(value.to_string()));
        applied += 1;
    }

    Ok(applied)
}

/// Read key-value lines from `source` into `dest`.
///
/// The whole text is read before the first line is applied, so a failed read
/// leaves `dest` untouched. Returns `Ok(true)` on success; failures are
/// handled according to `policy`.
pub async fn update_from_key_value<S>(
    dest: &mut Map<String, Value>,
    source: &S,
    options: &KeyValueOptions,
    policy: ErrorPolicy<'_>,
) -> LoadResult<bool>
where
    S: TextSource + ?Sized,
{
    let outcome = load_key_value(dest, source, options).await;
    policy.settle(outcome)
}

async fn load_key_value<S>(
    dest: &mut Map<String, Value>,
    source: &S,
    options: &KeyValueOptions,
) -> LoadResult<()>
where
    S: TextSource + ?Sized,
{
    // Checked before fetching so a bad separator never triggers a read.
    if options.separator.is_empty() {
        return Err(LoadError::InvalidSeparator);
    }

    let text = source.fetch_text().await?;
    let applied = apply_key_value_lines(dest, &text, options)?;
    tracing::debug!(source = %source.describe(), entries = applied, "loaded key-value pairs");
    Ok(())
}

/// Read key-value lines from the file at `path` into `dest`.
pub async fn update_from_key_value_file(
    dest: &mut Map<String, Value>,
    path: impl AsRef<Path>,
    options: &KeyValueOptions,
    policy: ErrorPolicy<'_>,
) -> LoadResult<bool> {
    let source = FileSource::new(path.as_ref());
    update_from_key_value(dest, &source, options, policy).await
}

/// Read key-value lines from `url` into `dest`.
///
/// A response status of 400 or above is a failure.
pub async fn update_from_url(
    dest: &mut Map<String, Value>,
    url: &str,
    options: &KeyValueOptions,
    policy: ErrorPolicy<'_>,
) -> LoadResult<bool> {
    let source = match UrlSource::new(url) {
        Ok(source) => source,
        Err(err) => return policy.settle(Err(err)),
    };
    update_from_key_value(dest, &source, options, policy).await
}
