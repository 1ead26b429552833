//! WooCommerce REST API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP with consumer credentials sent as HTTP Basic
//! auth. Caches single products, variations, payment gateways and general
//! settings using `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use sabad_core::ProductId;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, CacheValue};
use super::types::{
    CreatedOrder, OrderRequest, PaymentGateway, Product, ProductCategory, ProductVariation,
    StoreSetting,
};
use super::{WooCommerceError, api_error_message};
use crate::config::WooCommerceConfig;

// =============================================================================
// WooCommerceClient
// =============================================================================

/// Client for the WooCommerce REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct WooCommerceClient {
    inner: Arc<WooCommerceClientInner>,
}

struct WooCommerceClientInner {
    client: reqwest::Client,
    api_base: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl WooCommerceClient {
    /// Create a new WooCommerce API client.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials cannot form a header value or the
    /// HTTP client fails to build.
    pub fn new(config: &WooCommerceConfig) -> Result<Self, WooCommerceError> {
        let mut headers = HeaderMap::new();

        let credentials = BASE64.encode(format!(
            "{}:{}",
            config.consumer_key.expose_secret(),
            config.consumer_secret.expose_secret()
        ));
        let mut auth_value = HeaderValue::from_str(&format!("Basic {credentials}"))
            .map_err(|e| WooCommerceError::InvalidCredentials(e.to_string()))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(WooCommerceClientInner {
                client,
                api_base: config.api_base(),
                cache,
            }),
        })
    }

    /// Send a GET request and decode the JSON response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, WooCommerceError> {
        let url = format!("{}{path}", self.inner.api_base);
        let response = self.inner.client.get(&url).send().await?;
        Self::decode(path, response).await
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, WooCommerceError> {
        let url = format!("{}{path}", self.inner.api_base);
        let response = self.inner.client.post(&url).json(body).send().await?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, WooCommerceError> {
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(WooCommerceError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            warn!(
                status = %status,
                path = %path,
                body = %response_text.chars().take(500).collect::<String>(),
                "WooCommerce API returned non-success status"
            );
            return Err(WooCommerceError::Api {
                status: status.as_u16(),
                message: api_error_message(&response_text),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            warn!(
                error = %e,
                path = %path,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse WooCommerce response"
            );
            WooCommerceError::Parse(e)
        })
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a page of published products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Product>, WooCommerceError> {
        self.get(&format!(
            "/products?page={page}&per_page={per_page}&status=publish"
        ))
        .await
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `WooCommerceError::NotFound` if the product does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, WooCommerceError> {
        let cache_key = CacheKey::Product(id);

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&format!("/products/{id}")).await.map_err(|e| {
            if let WooCommerceError::NotFound(_) = e {
                WooCommerceError::NotFound(format!("Product not found: {id}"))
            } else {
                e
            }
        })?;

        // Cache the result
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the top-level product categories (up to 100).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<ProductCategory>, WooCommerceError> {
        self.get("/products/categories?parent=0&per_page=100").await
    }

    /// Get the variations of a variable product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product_variations(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariation>, WooCommerceError> {
        let cache_key = CacheKey::Variations(product_id);

        if let Some(CacheValue::Variations(variations)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for variations");
            return Ok(variations);
        }

        let variations: Vec<ProductVariation> = self
            .get(&format!("/products/{product_id}/variations"))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Variations(variations.clone()))
            .await;

        Ok(variations)
    }

    // =========================================================================
    // Checkout Methods
    // =========================================================================

    /// Create an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the order is rejected.
    #[instrument(skip(self, order), fields(
        payment_method = %order.payment_method,
        line_items = order.line_items.len()
    ))]
    pub async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> Result<CreatedOrder, WooCommerceError> {
        let created: CreatedOrder = self.post("/orders", order).await?;
        debug!(order_id = %created.id, status = %created.status, "Order created");
        Ok(created)
    }

    /// Get the store's general settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_general_settings(&self) -> Result<Vec<StoreSetting>, WooCommerceError> {
        let cache_key = CacheKey::GeneralSettings;

        if let Some(CacheValue::GeneralSettings(settings)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for general settings");
            return Ok(settings);
        }

        let settings: Vec<StoreSetting> = self.get("/settings/general").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::GeneralSettings(settings.clone()))
            .await;

        Ok(settings)
    }

    /// Get all configured payment gateways, enabled or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_payment_gateways(&self) -> Result<Vec<PaymentGateway>, WooCommerceError> {
        let cache_key = CacheKey::PaymentGateways;

        if let Some(CacheValue::PaymentGateways(gateways)) = self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for payment gateways");
            return Ok(gateways);
        }

        let gateways: Vec<PaymentGateway> = self.get("/payment_gateways").await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::PaymentGateways(gateways.clone()))
            .await;

        Ok(gateways)
    }
}
