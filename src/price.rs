//! Numeric normalization shared by both site parsers.
//!
//! Prices arrive as localized display strings (`₦12,345`, `₦ 1,299.99`).
//! They are cleaned, parsed as decimals, and truncated to whole currency
//! units. None of these functions fail loudly: callers get an
//! [`ExtractionWarning`] they can fold into a sentinel.

use crate::error::ExtractionWarning;
use once_cell::sync::Lazy;
use regex::Regex;

/// Currency markers and thousands separators removed before parsing.
static CURRENCY_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[₦$€£,\s]|\bngn\b").expect("valid currency regex"));

/// First decimal number in a string, e.g. `4.5` in `4.5 out of 5`.
static FIRST_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number regex"));

/// Parse a currency display string into whole units, truncating any fraction.
///
/// # Arguments
///
/// * `raw` - The display text, e.g. `₦ 12,345.50`
/// * `field` - Field name recorded on the warning when parsing fails
///
/// # Returns
///
/// The amount in whole units, or an [`ExtractionWarning`] when the text is
/// not a number, is negative, or does not fit in an `i64`.
///
/// ```ignore
/// assert_eq!(parse_price("₦12,345", "price"), Ok(12345));
/// assert!(parse_price("N/A", "price").is_err());
/// ```
pub fn parse_price(raw: &str, field: &'static str) -> Result<i64, ExtractionWarning> {
    let cleaned = CURRENCY_NOISE.replace_all(raw.trim(), "");
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() && (0.0..MAX_PRICE).contains(&value) => {
            Ok(value.trunc() as i64)
        }
        _ => Err(ExtractionWarning::invalid(field, raw.trim())),
    }
}

/// Upper bound for a parsed amount; `i64::MAX as f64` rounds up past `i64::MAX`.
const MAX_PRICE: f64 = 9.0e18;

/// Parse a bare rating value such as `4.3`. Empty input is a missing rating.
pub fn parse_rating(raw: &str) -> Result<f64, ExtractionWarning> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ExtractionWarning::missing("rating"));
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ExtractionWarning::invalid("rating", raw)),
    }
}

/// Pull the first number out of free text like `4.5 out of 5` or `(123 verified ratings)`.
pub fn first_number(raw: &str) -> Option<f64> {
    let raw = raw.replace(',', "");
    FIRST_NUMBER
        .find(&raw)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// `(old - price) / old * 100` rounded to two decimals, or `0` when there is no old price.
pub fn discount_percentage(price: i64, old_price: i64) -> f64 {
    if old_price <= 0 {
        return 0.0;
    }
    let old = old_price as f64;
    round2((old - price as f64) / old * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_naira_with_thousands_separator() {
        assert_eq!(parse_price("₦12,345", "price"), Ok(12345));
        assert_eq!(parse_price("  ₦ 1,299.99 ", "price"), Ok(1299));
        assert_eq!(parse_price("NGN 4,500", "price"), Ok(4500));
        assert_eq!(parse_price("750", "price"), Ok(750));
    }

    #[test]
    fn garbled_price_is_a_warning_not_a_panic() {
        let err = parse_price("N/A", "price").unwrap_err();
        assert_eq!(err.field, "price");
        assert!(err.reason.contains("N/A"));

        assert!(parse_price("", "old_price").is_err());
        assert!(parse_price("₦1,000 - ₦2,000", "price").is_err());
        assert!(parse_price("NaN", "price").is_err());
    }

    #[test]
    fn negative_and_oversized_prices_are_warnings() {
        assert_eq!(parse_price("-1", "price"), Err(ExtractionWarning::invalid("price", "-1")));
        assert!(parse_price("₦ -2,500", "price").is_err());
        assert!(parse_price("99999999999999999999999", "old_price").is_err());
        assert_eq!(parse_price("0", "price"), Ok(0));
    }

    #[test]
    fn discount_at_extremes_does_not_overflow() {
        let discount = discount_percentage(-1, i64::MAX);
        assert!(discount.is_finite());
        assert!(discount_percentage(i64::MAX, 1) < 0.0);
        assert_eq!(discount_percentage(0, i64::MAX), 100.0);
    }

    #[test]
    fn discount_from_old_price() {
        assert_eq!(discount_percentage(750, 1000), 25.0);
        assert_eq!(discount_percentage(750, 0), 0.0);
        assert_eq!(discount_percentage(2000, 3000), 33.33);
    }

    #[test]
    fn rating_parsing() {
        assert_eq!(parse_rating("4.3"), Ok(4.3));
        assert_eq!(parse_rating("").unwrap_err().field, "rating");
        assert!(parse_rating("great").is_err());
    }

    #[test]
    fn first_number_in_text() {
        assert_eq!(first_number("4.5 out of 5"), Some(4.5));
        assert_eq!(first_number("(1,234 verified ratings)"), Some(1234.0));
        assert_eq!(first_number("no stars"), None);
    }
}
