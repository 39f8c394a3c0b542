//! Tools for configuration collections.
//!
//! - [`Translator`] replaces `{KEY}` placeholders in strings, lists and nested
//!   maps with values from a replacement function.
//! - [`loader`] fills a map from `KEY=VALUE` files, URLs or JSON documents,
//!   optionally checking that mandatory key paths exist.
//! - [`contains_path`] / [`resolve_path`] walk dotted key paths.
//!
//! ```
//! use collectiontools::{MissingValue, Translator, value_lookup};
//! use serde_json::json;
//!
//! let values = json!({"user": {"name": "Miller"}});
//! let lookup = value_lookup(values.as_object().unwrap().clone(), ".", MissingValue::Keep);
//! let translator = Translator::from_fn(lookup);
//!
//! let greeting = translator.translate(json!(["Hello {user.name}", r"\{literal\}"])).unwrap();
//! assert_eq!(greeting, json!(["Hello Miller", "{literal}"]));
//! ```

pub mod error;
pub mod loader;
pub mod path;
pub mod pattern;
pub mod translator;


pub use error::{LoadError, LoadResult, ReplacementError, TranslateError, TranslateResult};
pub use loader::{ErrorPolicy, JsonOptions, KeyValueOptions, TextSource};
pub use path::{contains_path, resolve_path};
pub use pattern::{DEFAULT_TOKEN_PATTERN, Token, TokenPattern, unescape};
pub use translator::{MissingValue, ReplacementFn, Translator, value_lookup};
