//! Sabad Core - Shared types library.
//!
//! This crate provides common types used across all Sabad components:
//! - `storefront` - Shopper-facing storefront backed by the WooCommerce REST API
//! - `integration-tests` - End-to-end tests against a fake WooCommerce server
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, catalog statuses, price parsing/formatting and
//!   Persian solar calendar dates

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
