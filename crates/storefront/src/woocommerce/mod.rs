//! WooCommerce REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS with `reqwest`, HTTP Basic consumer credentials
//! - WooCommerce is the source of truth; nothing is persisted locally
//! - In-memory caching via `moka` for single products, variations, payment
//!   gateways and general settings (5 minute TTL)
//!
//! # Example
//!
//! ```rust,ignore
//! use sabad_storefront::woocommerce::WooCommerceClient;
//!
//! let client = WooCommerceClient::new(&config.woocommerce)?;
//!
//! let products = client.get_products(1, 20).await?;
//! let variations = client.get_product_variations(products[0].id).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::WooCommerceClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the WooCommerce API.
#[derive(Debug, Error)]
pub enum WooCommerceError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Consumer credentials could not be encoded into a header.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
}

/// Error body returned by the WordPress REST API.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Extract a readable message from an error response body.
fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(err) if !err.message.is_empty() && !err.code.is_empty() => {
            format!("{} ({})", err.message, err.code)
        }
        Ok(err) if !err.message.is_empty() => err.message,
        _ => body.chars().take(200).collect(),
    }
}
