//! Static JSON documents read from disk or over HTTP.
//!
//! Site settings and the slider configuration are plain JSON files. In
//! development they sit in the public directory; in production they may be
//! served by a CDN. [`DocumentSource`] covers both.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Errors that can occur when reading a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{location} returned status {status}")]
    Status { location: String, status: u16 },

    #[error("Failed to read {path}: {error}")]
    Io {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid document reference {0:?}")]
    InvalidReference(String),
}

/// Location of a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Remote(Url),
    Local(PathBuf),
}

impl FromStr for DocumentSource {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Url::parse(s).map(Self::Remote)
        } else {
            Ok(Self::Local(PathBuf::from(s)))
        }
    }
}

impl std::fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl DocumentSource {
    /// Resolve a reference found inside this document.
    ///
    /// Absolute URLs are used as-is. Anything else is relative to this
    /// document: joined to its URL, or for local files to its directory
    /// (a leading `/` means the directory root, as a web server would).
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::InvalidReference` for an empty reference or
    /// one that cannot be joined to a remote base.
    pub fn resolve(&self, reference: &str) -> Result<Self, DocumentError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DocumentError::InvalidReference(reference.to_string()));
        }
        if let Ok(url) = Url::parse(reference)
            && matches!(url.scheme(), "http" | "https")
        {
            return Ok(Self::Remote(url));
        }

        match self {
            Self::Remote(base) => base
                .join(reference)
                .map(Self::Remote)
                .map_err(|_| DocumentError::InvalidReference(reference.to_string())),
            Self::Local(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new(""));
                Ok(Self::Local(dir.join(reference.trim_start_matches('/'))))
            }
        }
    }
}

/// Reads [`DocumentSource`]s.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    client: reqwest::Client,
}

impl DocumentLoader {
    /// Create a loader with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new() -> Result<Self, DocumentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }

    /// Fetch and decode a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, an
    /// unreadable file, or malformed JSON.
    #[instrument(skip(self), fields(source = %source))]
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        source: &DocumentSource,
    ) -> Result<T, DocumentError> {
        let body = match source {
            DocumentSource::Remote(url) => {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(DocumentError::Status {
                        location: url.to_string(),
                        status: status.as_u16(),
                    });
                }
                response.text().await?
            }
            DocumentSource::Local(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|error| DocumentError::Io {
                        path: path.display().to_string(),
                        error,
                    })?
            }
        };
        debug!(bytes = body.len(), "Document loaded");
        Ok(serde_json::from_str(&body)?)
    }
}
