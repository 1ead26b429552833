//! Product detail route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sabad_core::ProductId;
use tracing::instrument;

use crate::catalog::ProductView;
use crate::error::{Result, add_breadcrumb};
use crate::fallback::with_fallback;
use crate::middleware::Shopper;
use crate::state::AppState;
use crate::woocommerce::{Product, ProductVariation, WooCommerceError};

/// Find a product in the loaded catalog, or ask WooCommerce for it.
pub(crate) async fn find_product(
    state: &AppState,
    id: ProductId,
) -> std::result::Result<Product, WooCommerceError> {
    if let Some(product) = state.catalog().read().await.product(id) {
        return Ok(product.clone());
    }
    state.woocommerce().get_product(id).await
}

/// Product details. Opens the details modal for this product.
#[instrument(skip(state, shopper))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    mut shopper: Shopper,
) -> Result<Json<ProductView>> {
    let product = find_product(&state, id).await?;

    let product_id = id.to_string();
    add_breadcrumb(
        "navigation",
        "Viewed product",
        Some(&[("product_id", product_id.as_str())]),
    );
    shopper.open_details(id);
    shopper.save().await?;

    Ok(Json(ProductView::from(&product)))
}

/// Close the details modal.
pub async fn close(mut shopper: Shopper) -> Result<StatusCode> {
    shopper.close_details();
    shopper.save().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Variations of a variable product. Empty when they cannot be loaded.
#[instrument(skip(state))]
pub async fn variations(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Json<Vec<ProductVariation>> {
    let loaded = with_fallback(
        "variations",
        state.woocommerce().get_product_variations(id),
        Vec::new,
    )
    .await;
    Json(loaded.into_value())
}
