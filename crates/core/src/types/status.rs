//! Status enums for catalog and order entities.
//!
//! The string forms match the WooCommerce REST API values exactly.

use serde::{Deserialize, Serialize};

/// Kind of WooCommerce product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Simple,
    Variable,
    Grouped,
    External,
    /// Any product type added by a plugin.
    #[serde(other)]
    Other,
}

/// Product or variation stock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
    OnBackorder,
    /// Any stock status registered by a plugin.
    #[serde(other)]
    Other,
}

impl StockStatus {
    /// Whether the item can be put in a cart right now.
    #[must_use]
    pub const fn is_in_stock(self) -> bool {
        matches!(self, Self::InStock)
    }

    /// Persian label shown next to the stock indicator.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "موجود",
            Self::OutOfStock | Self::OnBackorder | Self::Other => "ناموجود",
        }
    }
}

/// Order status.
///
/// Maps to WooCommerce's order status values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
    CheckoutDraft,
    /// Any status registered by a plugin.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
            Self::CheckoutDraft => "checkout-draft",
            Self::Other => "other",
        };
        f.write_str(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_wire_format() {
        let status: StockStatus = serde_json::from_str("\"outofstock\"").unwrap();
        assert_eq!(status, StockStatus::OutOfStock);
        assert_eq!(
            serde_json::to_string(&StockStatus::OnBackorder).unwrap(),
            "\"onbackorder\""
        );
        assert!(StockStatus::InStock.is_in_stock());
        assert!(!StockStatus::OnBackorder.is_in_stock());
    }

    #[test]
    fn test_stock_status_unknown_value() {
        let status: StockStatus = serde_json::from_str("\"preorder\"").unwrap();
        assert_eq!(status, StockStatus::Other);
        assert!(!status.is_in_stock());
        assert_eq!(status.label(), "ناموجود");
        assert_eq!(StockStatus::InStock.label(), "موجود");
    }

    #[test]
    fn test_product_type_unknown_value() {
        let kind: ProductType = serde_json::from_str("\"bundle\"").unwrap();
        assert_eq!(kind, ProductType::Other);
    }

    #[test]
    fn test_order_status_round_trip_names() {
        let status: OrderStatus = serde_json::from_str("\"on-hold\"").unwrap();
        assert_eq!(status, OrderStatus::OnHold);
        assert_eq!(OrderStatus::Processing.to_string(), "processing");
        let custom: OrderStatus = serde_json::from_str("\"awaiting-shipment\"").unwrap();
        assert_eq!(custom, OrderStatus::Other);
    }
}
