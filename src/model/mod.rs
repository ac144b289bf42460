//! Models for the payments API

use rusty_money::{iso, Money};
use serde::{Deserialize, Serialize};

pub mod account;
pub mod beneficiary;
pub mod billing;
pub mod card;
pub mod report;
pub mod transfer;
pub mod webhook;

pub use account::Account;
pub use beneficiary::Beneficiary;
pub use billing::{Invoice, InvoiceItem, Subscription, SubscriptionItem};
pub use card::{Card, Cardholder};
pub use report::Report;
pub use transfer::Transfer;
pub use webhook::Webhook;

/// Smallest and largest page size the API accepts
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 100;

/// One page of a list endpoint.
///
/// `has_more` only says that another page exists; it carries no total count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub page: u32,
    pub limit: i64,
}

impl ListOptions {
    /// Clamp `limit` into the range the API accepts
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page,
            limit: self.limit.clamp(MIN_LIMIT, MAX_LIMIT),
        }
    }

    #[must_use]
    pub fn query(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}

/// Format an amount in minor units, falling back to `<amount> <code>` for
/// currencies `rusty_money` does not know.
#[must_use]
pub fn format_money(minor: i64, currency: &str) -> String {
    match iso::find(currency) {
        Some(iso_code) => Money::from_minor(minor, iso_code).to_string(),
        None => format!("{minor} {currency}"),
    }
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_clamps_limit() {
        let low = ListOptions { page: 0, limit: 0 }.normalized();
        let high = ListOptions { page: 2, limit: 500 }.normalized();

        assert_eq!(low.limit, MIN_LIMIT);
        assert_eq!(high.limit, MAX_LIMIT);
        assert_eq!(high.page, 2);
    }

    #[test]
    fn list_result_tolerates_missing_has_more() {
        let result: ListResult<String> = serde_json::from_str(r#"{"items":["a"]}"#).unwrap();

        assert_eq!(result.items, vec!["a".to_string()]);
        assert!(!result.has_more);
    }

    #[test]
    fn unknown_currency_is_printed_raw() {
        assert_eq!(format_money(150, "XYZ"), "150 XYZ");
    }
}
