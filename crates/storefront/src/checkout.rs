//! Checkout: payment options, order building and submission.
//!
//! # Submission
//!
//! 1. Required customer fields are checked locally.
//! 2. An order is built from the cart, the payment method and the store
//!    currency, then sent to WooCommerce.
//! 3. If WooCommerce answers with a payment URL for an online gateway, the
//!    order is kept as pending and the shopper is sent to that URL.
//! 4. Otherwise the shopper lands on the thank-you view and the cart is
//!    emptied.
//!
//! When masking is enabled a failed submission still completes checkout,
//! with a synthetic cash-on-delivery order.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sabad_core::{OrderId, OrderStatus, ProductId, format_toman, iran_local_time, solar_date_time};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::cart::Cart;
use crate::fallback::{Loaded, with_fallback};
use crate::view::{ShopperSession, View, ViewError};
use crate::woocommerce::{
    COD_GATEWAY_ID, COD_GATEWAY_TITLE, CreatedOrder, CustomerInfo, OrderLineItem, OrderRequest,
    PaymentGateway, WooCommerceClient, WooCommerceError,
};

/// General setting holding the store currency.
pub const CURRENCY_SETTING_ID: &str = "woocommerce_currency";

/// Currency used when the store setting is unavailable.
pub const DEFAULT_CURRENCY: &str = "IRR";

/// Validation messages by form field.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

/// Errors that stop a checkout submission.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Checkout form is invalid")]
    Validation(FieldErrors),

    #[error("Cannot submit an empty cart")]
    EmptyCart,

    #[error("Cart line for product {0} has no usable price")]
    UnpricedLine(ProductId),

    #[error("Order submission failed: {0}")]
    Submission(#[from] WooCommerceError),

    #[error(transparent)]
    View(#[from] ViewError),
}

// =============================================================================
// Form
// =============================================================================

/// Submitted checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(flatten)]
    pub customer: CustomerInfo,
    /// Gateway id; defaults to the first enabled gateway.
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Check the required customer fields.
///
/// # Errors
///
/// Returns a message per missing field. Whitespace-only values count as
/// missing.
pub fn validate_customer(customer: &CustomerInfo) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if customer.first_name.trim().is_empty() {
        errors.insert("first_name", "نام الزامی است");
    }
    if customer.last_name.trim().is_empty() {
        errors.insert("last_name", "نام خانوادگی الزامی است");
    }
    if customer.phone.trim().is_empty() {
        errors.insert("phone", "شماره موبایل الزامی است");
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

// =============================================================================
// Payment Options
// =============================================================================

async fn fetch_enabled_gateways(
    client: &WooCommerceClient,
) -> Result<Vec<PaymentGateway>, WooCommerceError> {
    let gateways = client.get_payment_gateways().await?;
    Ok(gateways.into_iter().filter(|g| g.enabled).collect())
}

/// Enabled payment gateways, or cash on delivery alone when they cannot be
/// fetched.
pub async fn load_payment_gateways(client: &WooCommerceClient) -> Loaded<Vec<PaymentGateway>> {
    with_fallback("payment gateways", fetch_enabled_gateways(client), || {
        vec![PaymentGateway::cash_on_delivery()]
    })
    .await
}

/// Gateway preselected on the form.
#[must_use]
pub fn default_payment_method(gateways: &[PaymentGateway]) -> &str {
    gateways.first().map_or(COD_GATEWAY_ID, |g| g.id.as_str())
}

/// Store currency code, or [`DEFAULT_CURRENCY`].
pub async fn load_store_currency(client: &WooCommerceClient) -> String {
    match client.get_general_settings().await {
        Ok(settings) => settings
            .into_iter()
            .find(|s| s.id == CURRENCY_SETTING_ID)
            .and_then(|s| s.value.as_str().map(str::to_string))
            .filter(|currency| !currency.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        Err(e) => {
            warn!(error = %e, "Failed to load store settings, using default currency");
            DEFAULT_CURRENCY.to_string()
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Build the order payload for the current cart.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` for an empty cart and
/// `CheckoutError::UnpricedLine` when a line has no usable price.
pub fn build_order(
    cart: &Cart,
    customer: &CustomerInfo,
    payment_method: &str,
    gateways: &[PaymentGateway],
    currency: &str,
) -> Result<OrderRequest, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let line_items = cart
        .items()
        .iter()
        .map(|item| {
            let total = item
                .line_total()
                .map_err(|_| CheckoutError::UnpricedLine(item.product_id))?
                .normalize()
                .to_string();
            Ok(OrderLineItem {
                product_id: item.product_id,
                variation_id: item.variation_id,
                quantity: item.quantity,
                subtotal: total.clone(),
                total,
            })
        })
        .collect::<Result<Vec<_>, CheckoutError>>()?;

    let payment_method_title = gateways
        .iter()
        .find(|g| g.id == payment_method)
        .map(|g| g.title.clone())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| COD_GATEWAY_TITLE.to_string());

    Ok(OrderRequest {
        payment_method: payment_method.to_string(),
        payment_method_title,
        set_paid: false,
        billing: customer.clone(),
        shipping: customer.clone(),
        line_items,
        currency: currency.to_string(),
    })
}

/// An order shown on the thank-you view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedOrder {
    pub id: OrderId,
    pub number: String,
    pub status: OrderStatus,
    pub total: String,
    pub placed_at: DateTime<Utc>,
    /// True when the order was made up after a failed submission.
    #[serde(default)]
    pub synthetic: bool,
}

impl CompletedOrder {
    /// Wrap an order accepted by WooCommerce.
    #[must_use]
    pub fn from_created(order: CreatedOrder, placed_at: DateTime<Utc>) -> Self {
        Self {
            id: order.id,
            number: order.number,
            status: order.status,
            total: order.total,
            placed_at,
            synthetic: false,
        }
    }

    /// Stand-in for an order whose submission failed: the id is the current
    /// time in epoch milliseconds.
    #[must_use]
    pub fn synthetic(total: Decimal, placed_at: DateTime<Utc>) -> Self {
        let id = placed_at.timestamp_millis();
        Self {
            id: OrderId::new(id),
            number: id.to_string(),
            status: OrderStatus::Processing,
            total: total.normalize().to_string(),
            placed_at,
            synthetic: true,
        }
    }

    /// Order number shown to the shopper.
    #[must_use]
    pub fn display_number(&self) -> String {
        if self.number.is_empty() {
            self.id.to_string()
        } else {
            self.number.clone()
        }
    }

    /// Placement time in the Persian calendar, Iran local time.
    #[must_use]
    pub fn placed_at_display(&self) -> String {
        solar_date_time(iran_local_time(self.placed_at))
    }

    /// Total with the toman label, when the total is a number.
    #[must_use]
    pub fn total_display(&self) -> Option<String> {
        sabad_core::parse_price(&self.total).ok().map(format_toman)
    }
}

/// Order created for an online gateway, waiting for the shopper to pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub order: CreatedOrder,
    pub payment_url: String,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Checkout finished; the shopper is on the thank-you view.
    Completed { order: CompletedOrder },
    /// The shopper must continue at the gateway's payment page.
    Redirect { payment_url: String, order_id: OrderId },
}

/// Creates orders. Implemented by [`WooCommerceClient`].
pub trait OrderGateway {
    fn create_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<CreatedOrder, WooCommerceError>> + Send;
}

impl OrderGateway for WooCommerceClient {
    fn create_order(
        &self,
        order: &OrderRequest,
    ) -> impl Future<Output = Result<CreatedOrder, WooCommerceError>> + Send {
        Self::create_order(self, order)
    }
}

/// Checkout inputs that do not come from the shopper.
#[derive(Debug, Clone)]
pub struct CheckoutContext {
    pub gateways: Vec<PaymentGateway>,
    pub currency: String,
    /// Complete with a synthetic order when submission fails.
    pub mask_failures: bool,
}

/// Validate the form, submit the order and move the session on.
///
/// # Errors
///
/// Returns `CheckoutError` when the session is not on the checkout view, the
/// form is invalid, the cart cannot be priced, or submission fails while
/// masking is off.
#[instrument(skip_all, fields(payment_method = tracing::field::Empty))]
pub async fn submit_order<G: OrderGateway + Sync>(
    gateway: &G,
    session: &mut ShopperSession,
    form: &CheckoutForm,
    context: &CheckoutContext,
    now: DateTime<Utc>,
) -> Result<SubmissionOutcome, CheckoutError> {
    if session.view() != View::Checkout {
        return Err(ViewError::InvalidTransition {
            from: session.view(),
            to: View::ThankYou,
        }
        .into());
    }
    validate_customer(&form.customer).map_err(CheckoutError::Validation)?;

    let payment_method = form
        .payment_method
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default_payment_method(&context.gateways))
        .to_string();
    tracing::Span::current().record("payment_method", payment_method.as_str());

    let order = build_order(
        session.cart(),
        &form.customer,
        &payment_method,
        &context.gateways,
        &context.currency,
    )?;

    let completed = match gateway.create_order(&order).await {
        Ok(created) => {
            let payment_url = created
                .payment_url
                .clone()
                .filter(|url| !url.is_empty() && payment_method != COD_GATEWAY_ID);
            if let Some(payment_url) = payment_url {
                info!(order_id = %created.id, "Order awaiting external payment");
                let order_id = created.id;
                session.await_payment(PendingOrder {
                    order: created,
                    payment_url: payment_url.clone(),
                })?;
                return Ok(SubmissionOutcome::Redirect {
                    payment_url,
                    order_id,
                });
            }
            info!(order_id = %created.id, "Order placed");
            CompletedOrder::from_created(created, now)
        }
        Err(e) if context.mask_failures => {
            warn!(error = %e, "Order submission failed, completing with a synthetic order");
            // build_order succeeded, so every line has a price
            let total = session.cart().total_price().unwrap_or_default();
            CompletedOrder::synthetic(total, now)
        }
        Err(e) => return Err(e.into()),
    };

    session.complete(completed.clone())?;
    Ok(SubmissionOutcome::Completed { order: completed })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::*;
    use crate::cart::SelectedAttributes;
    use crate::fixtures;

    /// Records submitted orders and answers with a fixed result.
    struct FakeGateway {
        response: fn() -> Result<CreatedOrder, WooCommerceError>,
        submitted: Mutex<Vec<OrderRequest>>,
    }

    impl FakeGateway {
        fn new(response: fn() -> Result<CreatedOrder, WooCommerceError>) -> Self {
            Self {
                response,
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    impl OrderGateway for FakeGateway {
        fn create_order(
            &self,
            order: &OrderRequest,
        ) -> impl Future<Output = Result<CreatedOrder, WooCommerceError>> + Send {
            self.submitted.lock().unwrap().push(order.clone());
            let result = (self.response)();
            async move { result }
        }
    }

    fn created(payment_url: Option<&str>) -> CreatedOrder {
        CreatedOrder {
            id: OrderId::new(901),
            number: "901".to_string(),
            status: OrderStatus::Pending,
            total: "500000".to_string(),
            currency: "IRR".to_string(),
            payment_method: String::new(),
            payment_url: payment_url.map(str::to_string),
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            first_name: "مریم".to_string(),
            last_name: "احمدی".to_string(),
            phone: "09120000000".to_string(),
            ..CustomerInfo::default()
        }
    }

    fn form(payment_method: Option<&str>) -> CheckoutForm {
        CheckoutForm {
            customer: customer(),
            payment_method: payment_method.map(str::to_string),
        }
    }

    fn context(mask_failures: bool) -> CheckoutContext {
        CheckoutContext {
            gateways: vec![
                PaymentGateway::cash_on_delivery(),
                PaymentGateway {
                    id: "zarinpal".to_string(),
                    title: "زرین‌پال".to_string(),
                    description: String::new(),
                    enabled: true,
                },
            ],
            currency: "IRT".to_string(),
            mask_failures,
        }
    }

    fn checkout_session() -> ShopperSession {
        let mut session = ShopperSession::default();
        let products = fixtures::products();
        session
            .cart_mut()
            .add(products[0].clone(), 2, None, SelectedAttributes::new());
        session.begin_checkout().unwrap();
        session
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 10, 35, 0).unwrap()
    }

    #[test]
    fn test_validate_customer() {
        let blank = CustomerInfo {
            first_name: "  ".to_string(),
            ..CustomerInfo::default()
        };
        let errors = validate_customer(&blank).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["first_name"], "نام الزامی است");
        assert_eq!(errors["phone"], "شماره موبایل الزامی است");

        assert!(validate_customer(&customer()).is_ok());
    }

    #[test]
    fn test_build_order() {
        let mut cart = Cart::new();
        let products = fixtures::products();
        cart.add(products[0].clone(), 2, None, SelectedAttributes::new());
        cart.add(products[3].clone(), 1, None, SelectedAttributes::new());

        let order = build_order(&cart, &customer(), "zarinpal", &context(true).gateways, "IRT")
            .unwrap();

        assert_eq!(order.payment_method_title, "زرین‌پال");
        assert!(!order.set_paid);
        assert_eq!(order.billing, order.shipping);
        assert_eq!(order.currency, "IRT");
        assert_eq!(order.line_items.len(), 2);
        assert_eq!(order.line_items[0].subtotal, "500000");
        assert_eq!(order.line_items[0].total, "500000");
        assert_eq!(order.line_items[1].total, "1200000");
    }

    #[test]
    fn test_build_order_unknown_gateway_title() {
        let mut cart = Cart::new();
        cart.add(fixtures::products().remove(1), 1, None, SelectedAttributes::new());
        let order = build_order(&cart, &customer(), "bacs", &[], "IRR").unwrap();
        assert_eq!(order.payment_method_title, COD_GATEWAY_TITLE);
    }

    #[test]
    fn test_build_order_rejects_unpriced_line() {
        let mut cart = Cart::new();
        let mut product = fixtures::products().remove(0);
        product.price = String::new();
        cart.add(product, 1, None, SelectedAttributes::new());

        let err = build_order(&cart, &customer(), "cod", &[], "IRR").unwrap_err();
        assert!(matches!(err, CheckoutError::UnpricedLine(id) if id == ProductId::new(1)));
    }

    #[test]
    fn test_default_payment_method() {
        assert_eq!(default_payment_method(&[]), "cod");
        assert_eq!(default_payment_method(&context(true).gateways[1..]), "zarinpal");
    }

    #[test]
    fn test_completed_order_display() {
        let order = CompletedOrder::from_created(created(None), now());
        assert_eq!(order.display_number(), "901");
        assert_eq!(order.placed_at_display(), "۲۶ مهر ۱۴۰۵، ۱۴:۰۵");
        assert_eq!(order.total_display().as_deref(), Some("۵۰۰٬۰۰۰ تومان"));

        let mut unnumbered = order;
        unnumbered.number = String::new();
        assert_eq!(unnumbered.display_number(), "901");
    }

    #[tokio::test]
    async fn test_submit_cod_completes() {
        let gateway = FakeGateway::new(|| Ok(created(Some("https://pay.test/901"))));
        let mut session = checkout_session();

        let outcome = submit_order(&gateway, &mut session, &form(None), &context(true), now())
            .await
            .unwrap();

        // COD ignores the payment URL
        assert!(matches!(outcome, SubmissionOutcome::Completed { ref order } if !order.synthetic));
        assert_eq!(session.view(), View::ThankYou);
        assert!(session.cart().is_empty());
        assert_eq!(gateway.submitted.lock().unwrap()[0].payment_method, "cod");
    }

    #[tokio::test]
    async fn test_submit_online_gateway_redirects() {
        let gateway = FakeGateway::new(|| Ok(created(Some("https://pay.test/901"))));
        let mut session = checkout_session();

        let outcome = submit_order(
            &gateway,
            &mut session,
            &form(Some("zarinpal")),
            &context(true),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            SubmissionOutcome::Redirect {
                payment_url: "https://pay.test/901".to_string(),
                order_id: OrderId::new(901),
            }
        );
        assert_eq!(session.view(), View::Checkout);
        assert!(session.pending_order().is_some());
        assert_eq!(session.cart().total_item_count(), 2);
    }

    #[tokio::test]
    async fn test_submit_failure_is_masked() {
        let gateway = FakeGateway::new(|| {
            Err(WooCommerceError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        });
        let mut session = checkout_session();

        let outcome = submit_order(&gateway, &mut session, &form(None), &context(true), now())
            .await
            .unwrap();

        let SubmissionOutcome::Completed { order } = outcome else {
            panic!("expected a completed order");
        };
        assert!(order.synthetic);
        assert_eq!(order.id.as_i64(), now().timestamp_millis());
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.total, "500000");
        assert_eq!(session.view(), View::ThankYou);
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_submit_failure_surfaces_when_unmasked() {
        let gateway = FakeGateway::new(|| Err(WooCommerceError::NotFound("/orders".to_string())));
        let mut session = checkout_session();

        let err = submit_order(&gateway, &mut session, &form(None), &context(false), now())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Submission(_)));
        assert_eq!(session.view(), View::Checkout);
        assert_eq!(session.cart().total_item_count(), 2);
    }

    #[tokio::test]
    async fn test_submit_invalid_form_sends_nothing() {
        let gateway = FakeGateway::new(|| Ok(created(None)));
        let mut session = checkout_session();
        let mut bad = form(None);
        bad.customer.phone = String::new();

        let err = submit_order(&gateway, &mut session, &bad, &context(true), now())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(ref e) if e.contains_key("phone")));
        assert!(gateway.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_outside_checkout_view() {
        let gateway = FakeGateway::new(|| Ok(created(None)));
        let mut session = ShopperSession::default();

        let err = submit_order(&gateway, &mut session, &form(None), &context(true), now())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::View(ViewError::InvalidTransition { .. })));
    }
}
