//! Cache types for WooCommerce API responses.

use sabad_core::ProductId;

use super::types::{PaymentGateway, Product, ProductVariation, StoreSetting};

/// Cache key for API responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Variations(ProductId),
    PaymentGateways,
    GeneralSettings,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Variations(Vec<ProductVariation>),
    PaymentGateways(Vec<PaymentGateway>),
    GeneralSettings(Vec<StoreSetting>),
}
