//! Catalog route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use sabad_core::CategoryId;
use serde::Deserialize;
use tracing::instrument;

use crate::catalog::{Listing, reload_products};
use crate::state::AppState;

/// Query parameters for the shop listing.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    /// Selected category; all products when absent.
    pub category: Option<CategoryId>,
}

/// Products for the selected category plus the categories for the filter
/// bar.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<Listing> {
    let catalog = state.catalog().read().await;
    Json(catalog.listing(query.category))
}

/// Reload products after a failed load. Answers with the unfiltered listing;
/// `error` is still set if the reload failed too.
#[instrument(skip(state))]
pub async fn retry(State(state): State<AppState>) -> Json<Listing> {
    reload_products(state.woocommerce(), state.catalog()).await;
    let catalog = state.catalog().read().await;
    Json(catalog.listing(None))
}
