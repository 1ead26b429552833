//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Error bodies are JSON: `{"error": "..."}`, plus `"fields"` for checkout
//! validation failures.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sabad_core::ProductId;
use serde_json::json;
use thiserror::Error;

use crate::checkout::CheckoutError;
use crate::view::ViewError;
use crate::woocommerce::WooCommerceError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// WooCommerce API operation failed.
    #[error("WooCommerce error: {0}")]
    WooCommerce(#[from] WooCommerceError),

    /// Checkout could not proceed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Navigation not allowed from the current view.
    #[error("View error: {0}")]
    View(#[from] ViewError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Product (or its chosen variation) cannot be bought right now.
    #[error("Product {0} is out of stock")]
    OutOfStock(ProductId),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn is_server_error(&self) -> bool {
        match self {
            Self::WooCommerce(err) => !matches!(err, WooCommerceError::NotFound(_)),
            Self::Checkout(CheckoutError::Submission(_)) | Self::Session(_) | Self::Internal(_) => {
                true
            }
            _ => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::WooCommerce(WooCommerceError::NotFound(_)) | Self::NotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::WooCommerce(_) | Self::Checkout(CheckoutError::Submission(_)) => {
                StatusCode::BAD_GATEWAY
            }
            Self::Checkout(CheckoutError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Checkout(_) | Self::View(_) | Self::OutOfStock(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to shoppers.
    fn public_message(&self) -> String {
        match self {
            Self::WooCommerce(WooCommerceError::NotFound(_)) => "Not found".to_string(),
            Self::WooCommerce(_) | Self::Checkout(CheckoutError::Submission(_)) => {
                "External service error".to_string()
            }
            Self::Checkout(CheckoutError::UnpricedLine(_)) => {
                "Cart contains an item without a price".to_string()
            }
            Self::Checkout(err) => err.to_string(),
            Self::View(err) => err.to_string(),
            Self::Session(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let mut body = json!({ "error": self.public_message() });
        if let Self::Checkout(CheckoutError::Validation(fields)) = &self {
            body["fields"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
