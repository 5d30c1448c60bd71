//! Extraction of typed values from rendered storefront text.
//!
//! Order cards and cart rows render everything as prose ("Total: $24.99",
//! "Items: 2", "Order #17"). This module owns the parsing so the page
//! objects stay declarative.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::result::{ComprarError, ComprarResult};

/// A price in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(pub u64);

impl Money {
    /// Construct from whole dollars and cents
    #[must_use]
    pub const fn from_parts(dollars: u64, cents: u64) -> Self {
        Self(dollars * 100 + cents)
    }

    /// Value in cents
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

fn money_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$(\d+)\.(\d{2})").unwrap())
}

fn strict_price_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\$\d+\.\d{2}$").unwrap())
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").unwrap())
}

fn order_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Order\s*#\s*(\d+)").unwrap())
}

/// Find the first `$D+.DD` amount in free text
#[must_use]
pub fn find_money(text: &str) -> Option<Money> {
    let caps = money_re().captures(text)?;
    let dollars: u64 = caps.get(1)?.as_str().parse().ok()?;
    let cents: u64 = caps.get(2)?.as_str().parse().ok()?;
    Some(Money::from_parts(dollars, cents))
}

/// Parse an amount, erroring if the text has none
///
/// # Errors
///
/// [`ComprarError::Parse`] when no amount is present.
pub fn parse_money(text: &str) -> ComprarResult<Money> {
    find_money(text).ok_or_else(|| ComprarError::Parse {
        what: "price",
        text: text.to_string(),
    })
}

/// Whether the trimmed text is exactly a `$D+.DD` price
#[must_use]
pub fn is_price_format(text: &str) -> bool {
    strict_price_re().is_match(text.trim())
}

/// First integer in free text (cart badge counts, "Items: 2")
#[must_use]
pub fn find_count(text: &str) -> Option<u32> {
    integer_re()
        .find(text)
        .and_then(|m| m.as_str().parse().ok())
}

/// Integer following a `label:` prefix, e.g. `labeled_count("Items: 2", "Items")`
#[must_use]
pub fn labeled_count(text: &str, label: &str) -> Option<u32> {
    let idx = text.find(label)?;
    find_count(&text[idx + label.len()..])
}

/// Amount following a `label:` prefix, e.g. `labeled_money("Total: $9.50", "Total")`
#[must_use]
pub fn labeled_money(text: &str, label: &str) -> Option<Money> {
    let idx = text.find(label)?;
    find_money(&text[idx + label.len()..])
}

/// Order id from an `Order #N` heading
#[must_use]
pub fn find_order_id(text: &str) -> Option<u64> {
    order_id_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Order lifecycle statuses rendered in order cards
pub const ORDER_STATUSES: [&str; 5] =
    ["pending", "processing", "shipped", "delivered", "cancelled"];

/// First known status keyword in free text, lowercased
#[must_use]
pub fn find_status(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    ORDER_STATUSES
        .iter()
        .filter_map(|status| lower.find(status).map(|idx| (idx, *status)))
        .min_by_key(|(idx, _)| *idx)
        .map(|(_, status)| status.to_string())
}

/// Date text following a `Date:` label, stripped of the label
#[must_use]
pub fn date_text(text: &str) -> Option<String> {
    let idx = text.find("Date:")?;
    let rest = text[idx + "Date:".len()..].trim_start();
    let end = rest.find('\n').unwrap_or(rest.len());
    let value = rest[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Parse a rendered date in the formats the storefront uses
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y"];
    let trimmed = text.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod money_tests {
        use super::*;

        #[test]
        fn test_find_money_in_labeled_text() {
            assert_eq!(
                find_money("Total: $24.99"),
                Some(Money::from_parts(24, 99))
            );
        }

        #[test]
        fn test_find_money_absent() {
            assert_eq!(find_money("Your cart is empty"), None);
        }

        #[test]
        fn test_parse_money_errors_on_absence() {
            let err = parse_money("no price here").unwrap_err();
            assert!(matches!(err, ComprarError::Parse { what: "price", .. }));
        }

        #[test]
        fn test_money_display() {
            assert_eq!(Money::from_parts(7, 5).to_string(), "$7.05");
            assert_eq!(Money(0).to_string(), "$0.00");
            assert_eq!(Money(123_456).to_string(), "$1234.56");
        }

        #[test]
        fn test_strict_price_format() {
            assert!(is_price_format("$12.34"));
            assert!(is_price_format("  $0.00  "));
            assert!(!is_price_format("$12.3"));
            assert!(!is_price_format("12.34"));
            assert!(!is_price_format("Total: $12.34"));
        }

        proptest! {
            #[test]
            fn prop_display_roundtrips_through_find(cents in 0u64..10_000_000) {
                let money = Money(cents);
                let rendered = money.to_string();
                prop_assert_eq!(find_money(&rendered), Some(money));
                prop_assert!(is_price_format(&rendered));
            }
        }
    }

    mod count_tests {
        use super::*;

        #[test]
        fn test_badge_count() {
            assert_eq!(find_count("cart (3)"), Some(3));
            assert_eq!(find_count("cart"), None);
        }

        #[test]
        fn test_labeled_count() {
            assert_eq!(labeled_count("Items: 2", "Items"), Some(2));
            assert_eq!(labeled_count("Qty: 4 Items: 2", "Items"), Some(2));
            assert_eq!(labeled_count("Total: $5.00", "Items"), None);
        }

        #[test]
        fn test_labeled_money_skips_earlier_amounts() {
            let text = "Subtotal: $10.00\nTotal: $12.50";
            assert_eq!(
                labeled_money(text, "Total:"),
                Some(Money::from_parts(12, 50))
            );
        }
    }

    mod order_tests {
        use super::*;

        #[test]
        fn test_order_id_from_heading() {
            assert_eq!(find_order_id("Order #17"), Some(17));
            assert_eq!(find_order_id("Order # 204"), Some(204));
            assert_eq!(find_order_id("My Orders"), None);
        }

        #[test]
        fn test_status_keyword() {
            assert_eq!(find_status("Status: Pending"), Some("pending".to_string()));
            assert_eq!(
                find_status("This order was CANCELLED yesterday"),
                Some("cancelled".to_string())
            );
            assert_eq!(find_status("Order #3"), None);
        }

        #[test]
        fn test_first_status_wins() {
            assert_eq!(
                find_status("shipped (was pending)"),
                Some("shipped".to_string())
            );
        }

        #[test]
        fn test_date_text_strips_label() {
            assert_eq!(
                date_text("Date: 2025-06-14\nTotal: $9.99"),
                Some("2025-06-14".to_string())
            );
            assert_eq!(date_text("Total: $9.99"), None);
        }

        #[test]
        fn test_parse_date_formats() {
            let expected = NaiveDate::from_ymd_opt(2025, 6, 14).unwrap();
            assert_eq!(parse_date("2025-06-14"), Some(expected));
            assert_eq!(parse_date("06/14/2025"), Some(expected));
            assert_eq!(parse_date("June 14, 2025"), Some(expected));
            assert_eq!(parse_date("yesterday"), None);
        }
    }
}
