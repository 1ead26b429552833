//! Sabad storefront library.
//!
//! A WooCommerce-backed shop served as a JSON API. The library holds the
//! cart, catalog, checkout and view logic plus the HTTP layer, so the binary
//! and the integration tests share one router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod documents;
pub mod error;
pub mod fallback;
pub mod fixtures;
pub mod middleware;
pub mod routes;
pub mod settings;
pub mod slides;
pub mod state;
pub mod view;
pub mod woocommerce;
