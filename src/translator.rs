//! Recursive placeholder substitution
//!
//! A [`Translator`] searches strings, lists and maps for tokens (by default
//! `{KEY}`) and replaces each one with the value its replacement function
//! returns for the key. Lists and maps are walked recursively and changed in
//! place; strings are returned as new values.
//!
//! # Example
//!
//! ```
//! use collectiontools::Translator;
//! use serde_json::json;
//!
//! let translator = Translator::from_fn(|key: &str| Ok(format!("[{}]", key.to_uppercase())));
//!
//! let value = json!({"title": "{name} v{version}", "tags": ["{name}", 3]});
//! let translated = translator.translate(value).unwrap();
//! assert_eq!(translated, json!({"title": "[NAME] v[VERSION]", "tags": ["[NAME]", 3]}));
//! ```

use crate::error::{ReplacementError, TranslateError, TranslateResult};
use crate::path::resolve_path;
use crate::pattern::{TokenPattern, unescape};
use serde_json::{Map, Value};

/// Function turning a token key into its replacement text.
pub type ReplacementFn = Box<dyn Fn(&str) -> Result<String, ReplacementError> + Send + Sync>;

/// Placeholder translator for strings, lists and maps.
///
/// Both the replacement function and the pattern may be swapped between calls.
/// Without a replacement function tokens are left alone and only escape
/// sequences are resolved.
pub struct Translator {
    replacement: Option<ReplacementFn>,
    pattern: TokenPattern,
}

impl Translator {
    /// Translator with the default `{KEY}` pattern and no replacement function.
    pub fn new() -> Self {
        Translator {
            replacement: None,
            pattern: TokenPattern::default(),
        }
    }

    /// Translator with the default pattern and the given replacement function.
    pub fn from_fn<F>(replacement: F) -> Self
    where
        F: Fn(&str) -> Result<String, ReplacementError> + Send + Sync + 'static,
    {
        let mut translator = Self::new();
        translator.with_replacement(replacement);
        translator
    }

    pub fn with_replacement<F>(&mut self, replacement: F) -> &mut Self
    where
        F: Fn(&str) -> Result<String, ReplacementError> + Send + Sync + 'static,
    {
        self.replacement = Some(Box::new(replacement));
        self
    }

    pub fn without_replacement(&mut self) -> &mut Self {
        self.replacement = None;
        self
    }

    pub fn has_replacement(&self) -> bool {
        self.replacement.is_some()
    }

    /// Compile `expr` and use it as the token pattern.
    ///
    /// On error the previous pattern stays in place.
    pub fn with_pattern(&mut self, expr: &str) -> TranslateResult<&mut Self> {
        self.pattern = TokenPattern::new(expr)?;
        Ok(self)
    }

    pub fn set_pattern(&mut self, pattern: TokenPattern) -> &mut Self {
        self.pattern = pattern;
        self
    }

    pub fn pattern(&self) -> &TokenPattern {
        &self.pattern
    }

    /// Translate any value.
    ///
    /// Maps and lists are translated in place and handed back; strings are
    /// replaced by their translation; every other value is returned as is.
    pub fn translate(&self, value: Value) -> TranslateResult<Value> {
        match value {
            Value::Object(mut map) => {
                self.translate_map(&mut map)?;
                Ok(Value::Object(map))
            }
            Value::Array(mut list) => {
                self.translate_list(&mut list)?;
                Ok(Value::Array(list))
            }
            Value::String(s) => Ok(Value::String(self.translate_str(&s)?)),
            other => Ok(other),
        }
    }

    /// Replace the tokens in `s` and resolve escape sequences.
    ///
    /// The tokens are collected from `s` first. Then, left to right, each one
    /// triggers its own call of the replacement function, and the returned
    /// text replaces the first remaining occurrence of that token's text in
    /// the partially substituted string. The pattern is never run again, so
    /// no new tokens are picked up from replacement text.
    ///
    /// Escapes (`\{`, `\}`, `\/`) are resolved afterwards, also when no
    /// replacement function is set.
    pub fn translate_str(&self, s: &str) -> TranslateResult<String> {
        let substituted = match &self.replacement {
            Some(replacement) => self.substitute(s, replacement)?,
            None => s.to_string(),
        };
        Ok(unescape(&substituted))
    }

    fn substitute(&self, s: &str, replacement: &ReplacementFn) -> TranslateResult<String> {
        let tokens = self.pattern.find_tokens(s);
        let mut result = s.to_string();

        for token in tokens {
            let value = replacement(token.key()).map_err(TranslateError::Replacement)?;
            // An earlier replacement may have consumed the only remaining copy.
            if let Some(start) = result.find(token.text) {
                result.replace_range(start..start + token.text.len(), &value);
            }
        }

        Ok(result)
    }

    /// Translate all items of `list` in place and return it.
    ///
    /// Nested lists and maps keep their identity, string items are replaced by
    /// their translation. The first failing replacement aborts the walk; items
    /// visited before it stay translated.
    pub fn translate_list<'a>(&self, list: &'a mut Vec<Value>) -> TranslateResult<&'a mut Vec<Value>> {
        for item in list.iter_mut() {
            self.translate_in_place(item)?;
        }
        Ok(list)
    }

    /// Translate all values of `map` in place and return it. Keys are never changed.
    pub fn translate_map<'a>(
        &self,
        map: &'a mut Map<String, Value>,
    ) -> TranslateResult<&'a mut Map<String, Value>> {
        for value in map.values_mut() {
            self.translate_in_place(value)?;
        }
        Ok(map)
    }

    fn translate_in_place(&self, value: &mut Value) -> TranslateResult<()> {
        match value {
            Value::Object(map) => {
                self.translate_map(map)?;
            }
            Value::Array(list) => {
                self.translate_list(list)?;
            }
            Value::String(s) => {
                *s = self.translate_str(s)?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("pattern", &self.pattern.as_str())
            .field("has_replacement", &self.replacement.is_some())
            .finish()
    }
}

/// What [`value_lookup`] does with a key that has no value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingValue {
    /// Re-emit the token as `{key}`
    #[default]
    Keep,
    /// Fail the translation
    Fail,
}

/// Build a replacement function that looks keys up in `values`.
///
/// Keys are key paths (see [`resolve_path`]) split on `separator`. String
/// values are inserted verbatim, any other value as compact JSON.
pub fn value_lookup(
    values: Map<String, Value>,
    separator: &str,
    missing: MissingValue,
) -> impl Fn(&str) -> Result<String, ReplacementError> + Send + Sync + use<> {
    let separator = separator.to_string();
    move |key: &str| -> Result<String, ReplacementError> {
        match resolve_path(&values, key, &separator) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Ok(other.to_string()),
            None => match missing {
                MissingValue::Keep => Ok(format!("{{{}}}", key)),
                MissingValue::Fail => Err(format!("No value for placeholder '{}'", key).into()),
            },
        }
    }
}
