//! Fetch-with-fallback for data sources that must never fail the storefront.
//!
//! Every remote read the storefront makes at startup (site settings,
//! products, categories, slides) degrades the same way: on any error the
//! built-in value is used and a warning is logged.

use std::fmt::Display;
use std::future::Future;

use serde::Serialize;
use tracing::warn;

/// Where a loaded value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Fetched from the configured source.
    Live,
    /// Built-in substitute data.
    Fallback,
}

/// A value together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded<T> {
    pub value: T,
    pub source: Source,
    /// Error that caused the fallback.
    pub error: Option<String>,
}

impl<T> Loaded<T> {
    /// Wrap a value fetched from its source.
    pub const fn live(value: T) -> Self {
        Self {
            value,
            source: Source::Live,
            error: None,
        }
    }

    /// Wrap substitute data used because of `error`.
    pub fn fallback(value: T, error: impl Display) -> Self {
        Self {
            value,
            source: Source::Fallback,
            error: Some(error.to_string()),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == Source::Fallback
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// Await `fetch`; on error log a warning naming `what` and use `fallback()`.
pub async fn with_fallback<T, E, Fut, D>(what: &'static str, fetch: Fut, fallback: D) -> Loaded<T>
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    D: FnOnce() -> T,
{
    match fetch.await {
        Ok(value) => Loaded::live(value),
        Err(e) => {
            warn!(what, error = %e, "Failed to load, using built-in data");
            Loaded::fallback(fallback(), e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_fallback_live() {
        let loaded = with_fallback("numbers", async { Ok::<_, String>(vec![1, 2]) }, Vec::new).await;
        assert_eq!(loaded, Loaded::live(vec![1, 2]));
        assert!(!loaded.is_fallback());
    }

    #[tokio::test]
    async fn test_with_fallback_uses_default_on_error() {
        let loaded = with_fallback(
            "numbers",
            async { Err::<Vec<i32>, _>("connection refused") },
            || vec![7],
        )
        .await;
        assert!(loaded.is_fallback());
        assert_eq!(loaded.error.as_deref(), Some("connection refused"));
        assert_eq!(loaded.into_value(), vec![7]);
    }
}
