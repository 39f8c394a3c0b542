//! Configuration loaders
//!
//! Fill a `serde_json::Map` from line oriented `KEY=VALUE` text or from a JSON
//! document. The text comes from any [`TextSource`]: a file, a URL or a string
//! in memory.
//!
//! Every loader returns `LoadResult<bool>`. What happens on failure is chosen
//! by the caller through an [`ErrorPolicy`]:
//!
//! - `ErrorPolicy::reraise()` returns the [`LoadError`](crate::LoadError)
//! - `ErrorPolicy::report_to(&mut sink)` writes the error to `sink` and returns `Ok(false)`
//! - `ErrorPolicy::default()` only returns `Ok(false)`
//!
//! # Example
//!
//! ```ignore
//! use collectiontools::loader::{ErrorPolicy, JsonOptions, KeyValueOptions};
//! use collectiontools::loader::{update_from_json_file, update_from_key_value_file};
//! use serde_json::Map;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Map::new();
//!     let mut stderr = std::io::stderr();
//!
//!     update_from_key_value_file(
//!         &mut config,
//!         "app.properties",
//!         &KeyValueOptions::default(),
//!         ErrorPolicy::report_to(&mut stderr),
//!     )
//!     .await?;
//!
//!     let options = JsonOptions::with_mandatory_keys(["database.url"]);
//!     if !update_from_json_file(&mut config, "app.json", &options, ErrorPolicy::default()).await? {
//!         eprintln!("app.json is incomplete");
//!     }
//!     Ok(())
//! }
//! ```
pub mod json;
pub mod key_value;
pub mod policy;
pub mod source;

pub use json::{JsonOptions, check_mandatory_keys, parse_json_object, update_from_json, update_from_json_file};
pub use key_value::{
    KeyValueOptions, apply_key_value_lines, update_from_key_value, update_from_key_value_file,
    update_from_url,
};
pub use policy::ErrorPolicy;
pub use source::{FileSource, InlineSource, TextSource, UrlSource, open_source};
