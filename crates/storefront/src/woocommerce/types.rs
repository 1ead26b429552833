//! Wire types for the WooCommerce REST API.
//!
//! Field names match the JSON the API sends and accepts. Prices stay as
//! decimal strings on the wire; use [`sabad_core::parse_price`] when doing
//! arithmetic.

use rust_decimal::Decimal;
use sabad_core::{
    AttributeId, CategoryId, ImageId, OrderId, OrderStatus, PriceError, ProductId, ProductType,
    StockStatus, VariationId, parse_price,
};
use serde::{Deserialize, Serialize};

/// Image shown for products without any images.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.pexels.com/photos/3961793/pexels-photo-3961793.jpeg?auto=compress&cs=tinysrgb&w=400";

/// Payment gateway id for cash on delivery.
pub const COD_GATEWAY_ID: &str = "cod";

/// Display title of the cash-on-delivery gateway.
pub const COD_GATEWAY_TITLE: &str = "پرداخت در محل";

// =============================================================================
// Catalog Types
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Full description (HTML).
    #[serde(default)]
    pub description: String,
    /// Short description (HTML).
    #[serde(default)]
    pub short_description: String,
    /// Current price as a decimal string.
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    /// Empty when the product is not on sale.
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub categories: Vec<ProductCategory>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    /// Ids of the product's variations (variable products only).
    #[serde(default)]
    pub variations: Vec<VariationId>,
    #[serde(rename = "type", default)]
    pub kind: ProductType,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub manage_stock: bool,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
}

impl Product {
    /// Whether the product is discounted from its regular price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        !self.regular_price.is_empty() && self.regular_price != self.price
    }

    /// URL of the first image, or the placeholder image.
    #[must_use]
    pub fn main_image_url(&self) -> &str {
        self.images
            .first()
            .map_or(PLACEHOLDER_IMAGE_URL, |image| image.src.as_str())
    }

    /// Whether the product is listed in the given category.
    #[must_use]
    pub fn in_category(&self, category: CategoryId) -> bool {
        self.categories.iter().any(|c| c.id == category)
    }

    /// Whether the shopper must pick a variation before buying.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.kind == ProductType::Variable && !self.variations.is_empty()
    }

    /// Parsed current price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the price string is empty or malformed.
    pub fn unit_price(&self) -> Result<Decimal, PriceError> {
        parse_price(&self.price)
    }
}

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: ImageId,
    pub src: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alt: String,
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// Product attribute with its possible options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    #[serde(default)]
    pub id: AttributeId,
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Whether the attribute is used to define variations.
    #[serde(default)]
    pub variation: bool,
    #[serde(default)]
    pub visible: bool,
}

/// A purchasable configuration of a variable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariation {
    pub id: VariationId,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub regular_price: String,
    #[serde(default)]
    pub sale_price: String,
    #[serde(default)]
    pub attributes: Vec<VariationAttribute>,
    #[serde(default)]
    pub image: Option<ProductImage>,
    #[serde(default)]
    pub stock_status: StockStatus,
    #[serde(default)]
    pub stock_quantity: Option<i64>,
}

impl ProductVariation {
    /// Whether every chosen attribute of this variation matches `selected`.
    ///
    /// Attribute names are compared case-insensitively. A variation attribute
    /// with an empty option accepts any choice.
    #[must_use]
    pub fn matches<'a, I>(&self, selected: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)> + Clone,
    {
        self.attributes.iter().all(|attr| {
            attr.option.is_empty()
                || selected.clone().into_iter().any(|(name, option)| {
                    name.eq_ignore_ascii_case(&attr.name) && option == attr.option
                })
        })
    }
}

/// An attribute choice that defines a variation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariationAttribute {
    #[serde(default)]
    pub id: AttributeId,
    pub name: String,
    pub option: String,
}

// =============================================================================
// Store Types
// =============================================================================

/// A configured payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentGateway {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
}

impl PaymentGateway {
    /// The built-in cash-on-delivery gateway.
    #[must_use]
    pub fn cash_on_delivery() -> Self {
        Self {
            id: COD_GATEWAY_ID.to_string(),
            title: COD_GATEWAY_TITLE.to_string(),
            description: String::new(),
            enabled: true,
        }
    }
}

/// One entry of `GET /settings/general`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSetting {
    pub id: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

// =============================================================================
// Order Types
// =============================================================================

/// Billing and shipping details of the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address_1: String,
    pub city: String,
    pub state: String,
    pub postcode: String,
    pub country: String,
}

impl Default for CustomerInfo {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            address_1: String::new(),
            city: "N/A".to_string(),
            state: "N/A".to_string(),
            postcode: "N/A".to_string(),
            country: "IR".to_string(),
        }
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub payment_method: String,
    pub payment_method_title: String,
    pub set_paid: bool,
    pub billing: CustomerInfo,
    pub shipping: CustomerInfo,
    pub line_items: Vec<OrderLineItem>,
    pub currency: String,
}

/// One line of an order request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    /// Unit price times quantity, as a decimal string.
    pub subtotal: String,
    pub total: String,
}

/// Order returned by `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,
    /// Display number; may differ from the id when a numbering plugin is active.
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub payment_method: String,
    /// Where to send the shopper for online payment gateways.
    #[serde(default)]
    pub payment_url: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PRODUCT_JSON: &str = r#"{
        "id": 42,
        "name": "تی‌شرت",
        "price": "250000",
        "regular_price": "300000",
        "sale_price": "250000",
        "images": [{"id": 7, "src": "https://cdn.test/a.jpg", "name": "a", "alt": ""}],
        "categories": [{"id": 1, "name": "پوشاک", "slug": "clothing"}],
        "attributes": [{"id": 1, "name": "Size", "options": ["S", "M"], "variation": true, "visible": true}],
        "variations": [101, 102],
        "type": "variable",
        "stock_status": "instock",
        "manage_stock": false,
        "stock_quantity": null,
        "meta_data": []
    }"#;

    #[test]
    fn test_product_deserializes_api_payload() {
        let product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert_eq!(product.id, ProductId::new(42));
        assert_eq!(product.kind, ProductType::Variable);
        assert_eq!(product.variations.len(), 2);
        assert!(product.is_variable());
        assert!(product.in_category(CategoryId::new(1)));
        assert!(!product.in_category(CategoryId::new(2)));
        assert_eq!(product.main_image_url(), "https://cdn.test/a.jpg");
        assert_eq!(product.unit_price().unwrap(), Decimal::from(250_000));
    }

    #[test]
    fn test_product_missing_optional_fields() {
        let product: Product = serde_json::from_str(r#"{"id": 1, "name": "x"}"#).unwrap();
        assert_eq!(product.main_image_url(), PLACEHOLDER_IMAGE_URL);
        assert_eq!(product.stock_status, StockStatus::InStock);
        assert!(product.unit_price().is_err());
    }

    #[test]
    fn test_plugin_stock_status_does_not_break_the_list() {
        let products: Vec<Product> = serde_json::from_str(
            r#"[{"id": 1, "name": "a", "stock_status": "instock"},
                {"id": 2, "name": "b", "stock_status": "preorder"}]"#,
        )
        .unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].stock_status, StockStatus::Other);
    }

    #[test]
    fn test_is_on_sale() {
        let mut product: Product = serde_json::from_str(PRODUCT_JSON).unwrap();
        assert!(product.is_on_sale());

        product.regular_price = product.price.clone();
        assert!(!product.is_on_sale());

        product.regular_price = String::new();
        assert!(!product.is_on_sale());
    }

    #[test]
    fn test_variation_matches_selected_attributes() {
        let variation: ProductVariation = serde_json::from_str(
            r#"{"id": 101, "price": "260000", "attributes": [
                {"id": 1, "name": "Size", "option": "M"},
                {"id": 0, "name": "Color", "option": ""}
            ]}"#,
        )
        .unwrap();

        assert!(variation.matches([("size", "M"), ("Color", "Red")]));
        assert!(!variation.matches([("Size", "S")]));
        assert!(!variation.matches(std::iter::empty::<(&str, &str)>()));
    }

    #[test]
    fn test_order_line_item_omits_missing_variation() {
        let line = OrderLineItem {
            product_id: ProductId::new(3),
            variation_id: None,
            quantity: 2,
            subtotal: "200000".to_string(),
            total: "200000".to_string(),
        };
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("variation_id").is_none());
        assert_eq!(json["product_id"], 3);
    }

    #[test]
    fn test_customer_info_defaults() {
        let info: CustomerInfo =
            serde_json::from_str(r#"{"first_name": "علی", "last_name": "رضایی", "phone": "0912"}"#)
                .unwrap();
        assert_eq!(info.city, "N/A");
        assert_eq!(info.country, "IR");
        assert_eq!(info.address_1, "");
    }

    #[test]
    fn test_created_order_minimal_payload() {
        let order: CreatedOrder =
            serde_json::from_str(r#"{"id": 512, "number": "512", "status": "pending"}"#).unwrap();
        assert_eq!(order.id, OrderId::new(512));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.payment_url.is_none());
    }
}
