//! Checkout route handlers.

use axum::{Json, extract::State};
use chrono::Utc;
use sabad_core::OrderId;
use serde::Serialize;
use tracing::instrument;

use crate::checkout::{
    CheckoutContext, CheckoutForm, SubmissionOutcome, default_payment_method,
    load_payment_gateways, load_store_currency, submit_order,
};
use crate::error::{Result, add_breadcrumb};
use crate::fallback::Source;
use crate::middleware::Shopper;
use crate::routes::cart::CartView;
use crate::routes::view::OrderView;
use crate::state::AppState;
use crate::view::View;
use crate::woocommerce::PaymentGateway;

/// What the checkout form needs.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSummary {
    pub view: View,
    pub gateways: Vec<PaymentGateway>,
    pub gateways_source: Source,
    /// Preselected gateway id.
    pub payment_method: String,
    pub currency: String,
    pub cart: CartView,
}

/// Submission result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitResponse {
    Completed { order: OrderView },
    Redirect { payment_url: String, order_id: OrderId },
}

impl From<SubmissionOutcome> for SubmitResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        match outcome {
            SubmissionOutcome::Completed { order } => Self::Completed {
                order: OrderView::from(&order),
            },
            SubmissionOutcome::Redirect {
                payment_url,
                order_id,
            } => Self::Redirect {
                payment_url,
                order_id,
            },
        }
    }
}

async fn summary_for(state: &AppState, shopper: &Shopper) -> CheckoutSummary {
    let (gateways, currency) = tokio::join!(
        load_payment_gateways(state.woocommerce()),
        load_store_currency(state.woocommerce()),
    );

    CheckoutSummary {
        view: shopper.view(),
        payment_method: default_payment_method(&gateways.value).to_string(),
        gateways_source: gateways.source,
        gateways: gateways.value,
        currency,
        cart: CartView::new(shopper.cart(), shopper.is_cart_open()),
    }
}

/// Move from the shop to the checkout form.
#[instrument(skip_all)]
pub async fn begin(
    State(state): State<AppState>,
    mut shopper: Shopper,
) -> Result<Json<CheckoutSummary>> {
    shopper.begin_checkout()?;
    shopper.save().await?;
    add_breadcrumb("checkout", "Started checkout", None);

    Ok(Json(summary_for(&state, &shopper).await))
}

/// Payment options, currency and cart for the checkout form.
pub async fn summary(State(state): State<AppState>, shopper: Shopper) -> Json<CheckoutSummary> {
    Json(summary_for(&state, &shopper).await)
}

/// Submit the order.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    mut shopper: Shopper,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<SubmitResponse>> {
    let (gateways, currency) = tokio::join!(
        load_payment_gateways(state.woocommerce()),
        load_store_currency(state.woocommerce()),
    );
    let context = CheckoutContext {
        gateways: gateways.into_value(),
        currency,
        mask_failures: state.config().checkout.mask_submission_failures,
    };

    let outcome = submit_order(
        state.woocommerce(),
        &mut *shopper,
        &form,
        &context,
        Utc::now(),
    )
    .await?;
    shopper.save().await?;
    add_breadcrumb("checkout", "Order submitted", None);

    Ok(Json(outcome.into()))
}
