//! HTTP route handlers for storefront.
//!
//! The storefront is a JSON API for a single-page shop. Per-shopper state
//! (view, cart, panel and modal flags, last order) lives in the session.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                         - Health check
//! GET    /theme.css                      - Theme custom properties
//! GET    /static/*                       - Files from the public directory
//!
//! # Site
//! GET    /api/settings                   - Site settings
//! GET    /api/slides                     - Slide show
//!
//! # Catalog
//! GET    /api/catalog?category={id}      - Filtered products and filter bar
//! POST   /api/catalog/retry              - Reload products after a failure
//! GET    /api/products/{id}              - Product details (opens the modal)
//! DELETE /api/products/details           - Close the details modal
//! GET    /api/products/{id}/variations   - Variations of a product
//!
//! # Cart
//! GET    /api/cart                       - Cart lines and totals
//! POST   /api/cart/items                 - Add to cart
//! PATCH  /api/cart/items                 - Update quantity
//! DELETE /api/cart/items                 - Remove a line
//! POST   /api/cart/toggle                - Open or close the cart panel
//!
//! # View
//! GET    /api/view                       - Current view and flags
//! POST   /api/checkout                   - Shop to checkout
//! GET    /api/checkout                   - Checkout summary
//! POST   /api/checkout/submit            - Submit the order
//! POST   /api/shop                       - Back to shop
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod products;
pub mod site;
pub mod view;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{create_session_layer, request_id_middleware};
use crate::state::AppState;

/// Create the catalog and product routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(catalog::index))
        .route("/catalog/retry", post(catalog::retry))
        .route("/products/details", delete(products::close))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/variations", get(products::variations))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route(
            "/items",
            post(cart::add).patch(cart::update).delete(cart::remove),
        )
        .route("/toggle", post(cart::toggle))
}

/// Create all API routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(site::settings))
        .route("/slides", get(site::slides))
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .route("/view", get(view::show))
        .route("/checkout", get(checkout::summary).post(checkout::begin))
        .route("/checkout/submit", post(checkout::submit))
        .route("/shop", post(view::back_to_shop))
}

/// Build the full application: API, theme, static files and middleware.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    let public_dir = state.config().public_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/theme.css", get(site::theme_css))
        .nest("/api", routes())
        .nest_service("/static", ServeDir::new(public_dir))
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
