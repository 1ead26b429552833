//! Price parsing and Persian display formatting.
//!
//! WooCommerce sends every price as a decimal string (`"250000"`,
//! `"1499.50"`, or `""` when a sale price is unset). Prices are parsed into
//! [`Decimal`] for arithmetic and rendered the way a `fa-IR` number format
//! renders them: Persian digits, `٬` between thousands groups, `٫` as the
//! decimal separator and at most three fraction digits.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Currency label shown after every displayed price.
pub const TOMAN_LABEL: &str = "تومان";

const PERSIAN_DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];
const GROUP_SEPARATOR: char = '\u{066C}';
const DECIMAL_SEPARATOR: char = '\u{066B}';
const MAX_FRACTION_DIGITS: u32 = 3;

/// Errors that can occur when parsing a price string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// The price string is empty or whitespace.
    #[error("price is empty")]
    Empty,
    /// The price string is not a decimal number.
    #[error("invalid price: {0:?}")]
    Invalid(String),
}

/// Parse a WooCommerce decimal price string.
///
/// # Errors
///
/// Returns [`PriceError::Empty`] for blank input and [`PriceError::Invalid`]
/// when the input is not a decimal number.
pub fn parse_price(value: &str) -> Result<Decimal, PriceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PriceError::Empty);
    }
    Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(value.to_string()))
}

/// Format an amount for display with Persian digits and separators.
///
/// ```
/// use rust_decimal::Decimal;
/// use sabad_core::format_price;
///
/// assert_eq!(format_price(Decimal::from(250_000)), "۲۵۰٬۰۰۰");
/// ```
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = rounded.abs().to_string();
    let (integer, fraction) = text
        .split_once('.')
        .map_or((text.as_str(), None), |(i, f)| (i, Some(f)));

    let mut out = String::with_capacity(text.len() * 3);
    if negative {
        // Left-to-right mark keeps the minus sign attached in RTL text.
        out.push('\u{200E}');
        out.push('\u{2212}');
    }
    out.push_str(&to_persian_digits(&group_thousands(integer)));
    if let Some(fraction) = fraction {
        out.push(DECIMAL_SEPARATOR);
        out.push_str(&to_persian_digits(fraction));
    }
    out
}

/// Format an amount followed by the toman label, e.g. `۲۵۰٬۰۰۰ تومان`.
#[must_use]
pub fn format_toman(amount: Decimal) -> String {
    format!("{} {TOMAN_LABEL}", format_price(amount))
}

/// Replace ASCII digits with Persian digits, leaving other characters intact.
#[must_use]
pub fn to_persian_digits(value: &str) -> String {
    value
        .chars()
        .map(|ch| {
            ch.to_digit(10)
                .and_then(|d| usize::try_from(d).ok())
                .and_then(|d| PERSIAN_DIGITS.get(d).copied())
                .unwrap_or(ch)
        })
        .collect()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3 * 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(GROUP_SEPARATOR);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("100000").unwrap(), Decimal::from(100_000));
        assert_eq!(parse_price(" 1499.50 ").unwrap(), Decimal::new(149_950, 2));
        assert_eq!(parse_price(""), Err(PriceError::Empty));
        assert_eq!(parse_price("   "), Err(PriceError::Empty));
        assert!(matches!(parse_price("abc"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_format_price_groups_thousands() {
        assert_eq!(format_price(Decimal::from(250_000)), "۲۵۰٬۰۰۰");
        assert_eq!(format_price(Decimal::from(1_200_000)), "۱٬۲۰۰٬۰۰۰");
        assert_eq!(format_price(Decimal::from(1234)), "۱٬۲۳۴");
        assert_eq!(format_price(Decimal::from(999)), "۹۹۹");
        assert_eq!(format_price(Decimal::ZERO), "۰");
    }

    #[test]
    fn test_format_price_fraction_digits() {
        assert_eq!(format_price(Decimal::new(12_345, 1)), "۱٬۲۳۴٫۵");
        assert_eq!(format_price(Decimal::new(12_345, 5)), "۰٫۱۲۳");
        assert_eq!(format_price(Decimal::new(5, 4)), "۰٫۰۰۱");
        assert_eq!(format_price(Decimal::new(150_000, 2)), "۱٬۵۰۰");
    }

    #[test]
    fn test_format_price_negative() {
        assert_eq!(format_price(Decimal::from(-5)), "\u{200E}\u{2212}۵");
        assert_eq!(format_price(Decimal::new(-1, 5)), "۰");
    }

    #[test]
    fn test_format_toman() {
        assert_eq!(format_toman(Decimal::from(450_000)), "۴۵۰٬۰۰۰ تومان");
    }

    #[test]
    fn test_to_persian_digits_keeps_other_characters() {
        assert_eq!(to_persian_digits("#1402-07"), "#۱۴۰۲-۰۷");
    }
}
