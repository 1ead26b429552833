//! Shopper cart.
//!
//! A cart holds at most one line per (product, variation) pair. Lines keep a
//! snapshot of the product and variation as they were when added, so totals
//! do not change when the catalog is reloaded.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sabad_core::{PriceError, ProductId, VariationId, parse_price};
use serde::{Deserialize, Serialize};

use crate::woocommerce::{Product, ProductVariation};

/// Attribute choices made by the shopper, by attribute name.
pub type SelectedAttributes = BTreeMap<String, String>;

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
    pub product: Product,
    pub variation: Option<ProductVariation>,
    #[serde(default)]
    pub selected_attributes: SelectedAttributes,
}

impl CartItem {
    /// Price string used for this line: the variation's when it has one,
    /// otherwise the product's.
    #[must_use]
    pub fn unit_price_str(&self) -> &str {
        self.variation
            .as_ref()
            .map(|v| v.price.as_str())
            .filter(|price| !price.is_empty())
            .unwrap_or(&self.product.price)
    }

    /// Parsed unit price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the price string is empty or malformed.
    pub fn unit_price(&self) -> Result<Decimal, PriceError> {
        parse_price(self.unit_price_str())
    }

    /// Unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` if the price string is empty or malformed, or the
    /// product overflows.
    pub fn line_total(&self) -> Result<Decimal, PriceError> {
        self.unit_price()?
            .checked_mul(Decimal::from(self.quantity))
            .ok_or_else(|| PriceError::Invalid(self.unit_price_str().to_string()))
    }

    fn is(&self, product_id: ProductId, variation_id: Option<VariationId>) -> bool {
        self.product_id == product_id && self.variation_id == variation_id
    }
}

/// The cart: an ordered list of unique lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a (product, variation) pair.
    #[must_use]
    pub fn get(&self, product_id: ProductId, variation_id: Option<VariationId>) -> Option<&CartItem> {
        self.items.iter().find(|item| item.is(product_id, variation_id))
    }

    /// Add `quantity` of a product (or one of its variations).
    ///
    /// An existing line for the same pair has its quantity increased; the
    /// snapshot and attribute choices of the existing line are kept. Adding
    /// zero is a no-op.
    pub fn add(
        &mut self,
        product: Product,
        quantity: u32,
        variation: Option<ProductVariation>,
        selected_attributes: SelectedAttributes,
    ) {
        if quantity == 0 {
            return;
        }

        let product_id = product.id;
        let variation_id = variation.as_ref().map(|v| v.id);

        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.is(product_id, variation_id))
        {
            item.quantity = item.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(CartItem {
            product_id,
            variation_id,
            quantity,
            product,
            variation,
            selected_attributes,
        });
    }

    /// Remove the line for a (product, variation) pair, if present.
    pub fn remove(&mut self, product_id: ProductId, variation_id: Option<VariationId>) {
        self.items.retain(|item| !item.is(product_id, variation_id));
    }

    /// Replace the quantity of a line. Zero removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        variation_id: Option<VariationId>,
    ) {
        if quantity == 0 {
            self.remove(product_id, variation_id);
            return;
        }
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.is(product_id, variation_id))
        {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of line totals, or `None` if any line has an unusable price.
    #[must_use]
    pub fn total_price(&self) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |total, item| {
            total.checked_add(item.line_total().ok()?)
        })
    }

    /// Sum of quantities.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
