//! Per-shopper view state.
//!
//! A shopper is always on one of three views: the shop, the checkout form
//! or the thank-you page. Every path starts at the shop:
//!
//! ```text
//! shop --begin_checkout--> checkout --complete--> thankyou
//!  ^                          |                      |
//!  +-------back_to_shop-------+----------------------+
//! ```
//!
//! The product-details modal and the cart side panel are independent of the
//! current view. The whole state is stored in the shopper's session.

use sabad_core::ProductId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::Cart;
use crate::checkout::{CompletedOrder, PendingOrder};

/// Which page the shopper is on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Shop,
    Checkout,
    ThankYou,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Shop => "shop",
            Self::Checkout => "checkout",
            Self::ThankYou => "thankyou",
        })
    }
}

/// Errors from view transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ViewError {
    #[error("Cannot go from {from} to {to}")]
    InvalidTransition { from: View, to: View },

    #[error("Cannot check out with an empty cart")]
    EmptyCart,
}

/// Everything the storefront remembers about one shopper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopperSession {
    view: View,
    cart: Cart,
    /// Shown on the thank-you view.
    last_order: Option<CompletedOrder>,
    /// Order waiting for an external payment to finish.
    pending_order: Option<PendingOrder>,
    /// Product shown in the details modal.
    details: Option<ProductId>,
    cart_open: bool,
}

impl ShopperSession {
    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    #[must_use]
    pub const fn last_order(&self) -> Option<&CompletedOrder> {
        self.last_order.as_ref()
    }

    #[must_use]
    pub const fn pending_order(&self) -> Option<&PendingOrder> {
        self.pending_order.as_ref()
    }

    /// Product whose details modal is open.
    #[must_use]
    pub const fn details(&self) -> Option<ProductId> {
        self.details
    }

    #[must_use]
    pub const fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    fn require(&self, from: View, to: View) -> Result<(), ViewError> {
        if self.view == from {
            Ok(())
        } else {
            Err(ViewError::InvalidTransition {
                from: self.view,
                to,
            })
        }
    }

    /// `shop -> checkout`, only with something in the cart.
    ///
    /// # Errors
    ///
    /// Returns `ViewError` when not on the shop view or the cart is empty.
    pub fn begin_checkout(&mut self) -> Result<(), ViewError> {
        self.require(View::Shop, View::Checkout)?;
        if self.cart.is_empty() {
            return Err(ViewError::EmptyCart);
        }
        self.view = View::Checkout;
        Ok(())
    }

    /// `checkout -> thankyou`: record the order and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::InvalidTransition` when not on the checkout view.
    pub fn complete(&mut self, order: CompletedOrder) -> Result<(), ViewError> {
        self.require(View::Checkout, View::ThankYou)?;
        self.cart.clear();
        self.pending_order = None;
        self.last_order = Some(order);
        self.view = View::ThankYou;
        Ok(())
    }

    /// Keep an order whose payment happens on an external page. The view
    /// does not change; the shopper leaves the storefront.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::InvalidTransition` when not on the checkout view.
    pub fn await_payment(&mut self, order: PendingOrder) -> Result<(), ViewError> {
        self.require(View::Checkout, View::Checkout)?;
        self.pending_order = Some(order);
        Ok(())
    }

    /// Back to the shop from any view. Forgets the last completed order.
    pub fn back_to_shop(&mut self) {
        self.view = View::Shop;
        self.last_order = None;
    }

    pub const fn open_details(&mut self, product: ProductId) {
        self.details = Some(product);
    }

    pub const fn close_details(&mut self) {
        self.details = None;
    }

    /// Flip the cart side panel; returns the new state.
    pub const fn toggle_cart(&mut self) -> bool {
        self.cart_open = !self.cart_open;
        self.cart_open
    }
}
