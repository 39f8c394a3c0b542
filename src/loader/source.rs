//! Text sources for the loaders
//!
//! The loaders only need the full text of a document. Where it comes from is
//! hidden behind the [`TextSource`] trait, so the same loader reads a local
//! file, an HTTP(S) URL or a string already in memory.
//!
//! # Example
//!
//! ```ignore
//! use collectiontools::loader::{TextSource, open_source};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = open_source("https://example.org/app.properties")?;
//!     println!("{}", source.fetch_text().await?);
//!     Ok(())
//! }
//! ```

use crate::error::{LoadError, LoadResult};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Something a loader can read a whole document from
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Read the complete text of the source.
    async fn fetch_text(&self) -> LoadResult<String>;

    /// Human readable location, used in errors and log lines.
    fn describe(&self) -> String;
}

/// A file on the local file system
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

#[async_trait]
impl TextSource for FileSource {
    async fn fetch_text(&self) -> LoadResult<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LoadError::Read {
                location: self.describe(),
                reason: e.to_string(),
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A document fetched with an HTTP GET request
///
/// Any status of 400 or above is a failure.
#[derive(Clone)]
pub struct UrlSource {
    url: String,
    client: reqwest::Client,
}

impl UrlSource {
    /// Timeout for the whole request
    const TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(url: impl Into<String>) -> LoadResult<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| LoadError::Read {
                location: url.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self::with_client(url, client))
    }

    /// Use an existing client, e.g. one shared between several sources.
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        UrlSource {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl TextSource for UrlSource {
    async fn fetch_text(&self) -> LoadResult<String> {
        let read_error = |e: reqwest::Error| LoadError::Read {
            location: self.url.clone(),
            reason: e.to_string(),
        };

        let response = self.client.get(&self.url).send().await.map_err(read_error)?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(LoadError::Http {
                location: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(read_error)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

impl std::fmt::Debug for UrlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSource").field("url", &self.url).finish()
    }
}

/// Text that is already in memory (standard input, tests)
#[derive(Debug, Clone)]
pub struct InlineSource {
    name: String,
    text: String,
}

impl InlineSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        InlineSource {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[async_trait]
impl TextSource for InlineSource {
    async fn fetch_text(&self) -> LoadResult<String> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Pick a source for `location`: `http://` and `https://` locations are
/// fetched over the network, everything else is read as a file path.
pub fn open_source(location: &str) -> LoadResult<Box<dyn TextSource>> {
    let lower = location.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(Box::new(UrlSource::new(location)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}
