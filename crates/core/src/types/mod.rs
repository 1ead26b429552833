//! Core types for Sabad.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod date;
pub mod id;
pub mod price;
pub mod status;

pub use date::{IRAN_UTC_OFFSET_SECONDS, SolarDate, iran_local_time, solar_date, solar_date_time};
pub use id::*;
pub use price::{PriceError, TOMAN_LABEL, format_price, format_toman, parse_price, to_persian_digits};
pub use status::*;
