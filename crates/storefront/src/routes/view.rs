//! View state route handlers.

use axum::Json;
use chrono::{DateTime, Utc};
use sabad_core::{OrderId, OrderStatus, ProductId};
use serde::Serialize;

use crate::checkout::CompletedOrder;
use crate::error::Result;
use crate::middleware::Shopper;
use crate::view::View;

/// Completed order display data for the thank-you view.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: OrderId,
    pub number: String,
    pub status: OrderStatus,
    pub total: String,
    pub total_display: Option<String>,
    pub placed_at: DateTime<Utc>,
    /// Solar calendar date and time, Iran local time.
    pub placed_at_display: String,
    pub synthetic: bool,
}

impl From<&CompletedOrder> for OrderView {
    fn from(order: &CompletedOrder) -> Self {
        Self {
            id: order.id,
            number: order.display_number(),
            status: order.status,
            total: order.total.clone(),
            total_display: order.total_display(),
            placed_at: order.placed_at,
            placed_at_display: order.placed_at_display(),
            synthetic: order.synthetic,
        }
    }
}

/// Everything the client needs to pick what to render.
#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub view: View,
    pub cart_open: bool,
    /// Product shown in the details modal.
    pub details: Option<ProductId>,
    pub item_count: u64,
    pub last_order: Option<OrderView>,
    /// Set while an order waits for an external payment.
    pub payment_url: Option<String>,
}

impl From<&Shopper> for ViewResponse {
    fn from(shopper: &Shopper) -> Self {
        Self {
            view: shopper.view(),
            cart_open: shopper.is_cart_open(),
            details: shopper.details(),
            item_count: shopper.cart().total_item_count(),
            last_order: shopper.last_order().map(OrderView::from),
            payment_url: shopper.pending_order().map(|p| p.payment_url.clone()),
        }
    }
}

pub async fn show(shopper: Shopper) -> Json<ViewResponse> {
    Json(ViewResponse::from(&shopper))
}

/// Back to the shop from any view.
pub async fn back_to_shop(mut shopper: Shopper) -> Result<Json<ViewResponse>> {
    shopper.back_to_shop();
    shopper.save().await?;
    Ok(Json(ViewResponse::from(&shopper)))
}
