//! Cart route handlers.
//!
//! The cart lives in the shopper's session. Every mutating handler answers
//! with the updated cart so the client can re-render the side panel.

use axum::{Json, extract::State};
use sabad_core::{ProductId, VariationId, format_toman};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::cart::{Cart, CartItem, SelectedAttributes};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::fallback::with_fallback;
use crate::middleware::Shopper;
use crate::routes::products::find_product;
use crate::state::AppState;
use crate::woocommerce::{Product, ProductVariation};

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub item: CartItem,
    /// Price used for the line, as a decimal string.
    pub unit_price: String,
    pub line_total: Option<String>,
    pub line_total_display: Option<String>,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    /// `None` when a line has no usable price.
    pub total: Option<String>,
    pub total_display: Option<String>,
    pub item_count: u64,
    pub open: bool,
}

impl CartView {
    #[must_use]
    pub fn new(cart: &Cart, open: bool) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|item| {
                let line_total = item.line_total().ok();
                CartLineView {
                    item: item.clone(),
                    unit_price: item.unit_price_str().to_string(),
                    line_total: line_total.map(|t| t.normalize().to_string()),
                    line_total_display: line_total.map(format_toman),
                }
            })
            .collect();
        let total = cart.total_price();

        Self {
            items,
            total: total.map(|t| t.normalize().to_string()),
            total_display: total.map(format_toman),
            item_count: cart.total_item_count(),
            open,
        }
    }
}

fn cart_view(shopper: &Shopper) -> Json<CartView> {
    Json(CartView::new(shopper.cart(), shopper.is_cart_open()))
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    /// Defaults to 1; values below 1 are raised to 1.
    pub quantity: Option<u32>,
    /// Attribute choices; used to find the variation when no id is given.
    #[serde(default)]
    pub attributes: SelectedAttributes,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
    pub quantity: u32,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
    pub variation_id: Option<VariationId>,
}

/// Toggle response.
#[derive(Debug, Serialize)]
pub struct TogglePanelResponse {
    pub open: bool,
}

/// Pick the variation being bought: by id when given, otherwise the one
/// matching the chosen attributes of a variable product.
///
/// When no variation applies, or the variations cannot be loaded, the line
/// is added for the product itself at the product's price. Only an explicit
/// id missing from a loaded variation list is rejected.
async fn resolve_variation(
    state: &AppState,
    product: &Product,
    request: &AddToCartRequest,
) -> Result<Option<ProductVariation>> {
    let by_attributes = product.is_variable() && !request.attributes.is_empty();
    if request.variation_id.is_none() && !by_attributes {
        return Ok(None);
    }

    let variations = with_fallback(
        "variations",
        state.woocommerce().get_product_variations(product.id),
        Vec::new,
    )
    .await;
    if variations.is_fallback() {
        return Ok(None);
    }

    match request.variation_id {
        Some(id) => variations
            .into_value()
            .into_iter()
            .find(|v| v.id == id)
            .map(Some)
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Product {} has no variation {id}",
                    product.id
                ))
            }),
        None => Ok(variations.into_value().into_iter().find(|v| {
            v.matches(
                request
                    .attributes
                    .iter()
                    .map(|(name, option)| (name.as_str(), option.as_str())),
            )
        })),
    }
}

pub async fn show(shopper: Shopper) -> Json<CartView> {
    cart_view(&shopper)
}

/// Add a product (or one of its variations) to the cart. Out-of-stock
/// products are refused.
#[instrument(skip(state, shopper))]
pub async fn add(
    State(state): State<AppState>,
    mut shopper: Shopper,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = find_product(&state, request.product_id).await?;
    if !product.stock_status.is_in_stock() {
        return Err(AppError::OutOfStock(product.id));
    }
    let variation = resolve_variation(&state, &product, &request).await?;
    if variation
        .as_ref()
        .is_some_and(|v| !v.stock_status.is_in_stock())
    {
        return Err(AppError::OutOfStock(product.id));
    }
    let quantity = request.quantity.unwrap_or(1).max(1);

    let product_id = product.id.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", product_id.as_str())]),
    );
    shopper
        .cart_mut()
        .add(product, quantity, variation, request.attributes);
    shopper.save().await?;

    Ok(cart_view(&shopper))
}

/// Set the quantity of a line. Quantities below 1 are raised to 1; use
/// `DELETE` to remove a line.
#[instrument(skip(shopper))]
pub async fn update(
    mut shopper: Shopper,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    shopper.cart_mut().update_quantity(
        request.product_id,
        request.quantity.max(1),
        request.variation_id,
    );
    shopper.save().await?;

    Ok(cart_view(&shopper))
}

/// Remove a line.
#[instrument(skip(shopper))]
pub async fn remove(
    mut shopper: Shopper,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let product_id = request.product_id.to_string();
    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", product_id.as_str())]),
    );
    shopper
        .cart_mut()
        .remove(request.product_id, request.variation_id);
    shopper.save().await?;

    Ok(cart_view(&shopper))
}

/// Open or close the cart side panel.
pub async fn toggle(mut shopper: Shopper) -> Result<Json<TogglePanelResponse>> {
    let open = shopper.toggle_cart();
    shopper.save().await?;
    Ok(Json(TogglePanelResponse { open }))
}
