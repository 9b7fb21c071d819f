//! Raw transaction view consumed by the enrichment pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read-only projection of an imported transaction.
///
/// Everything except the identifiers, date, amount and display name is optional:
/// bank feeds are inconsistent about which fields they fill in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTransactionView {
    /// Unique identifier for this transaction
    pub id: String,
    /// Owning account identifier
    pub account_id: String,
    /// Posting date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Positive = income, negative = expense
    pub amount: f64,
    /// Display name as reported by the bank
    pub name: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: TransactionLocation,
    #[serde(default)]
    pub payment_channel: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub payment_processor: Option<String>,
    #[serde(default)]
    pub personal_finance_category: Option<String>,
}

/// Optional location fields attached to a transaction
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TransactionLocation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl RawTransactionView {
    /// Create a transaction with only the required fields set
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        date: NaiveDate,
        amount: f64,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            date,
            amount,
            name: name.into(),
            merchant_name: None,
            category: None,
            location: TransactionLocation::default(),
            payment_channel: None,
            payment_method: None,
            payment_processor: None,
            personal_finance_category: None,
        }
    }

    pub fn with_merchant_name(mut self, merchant_name: impl Into<String>) -> Self {
        self.merchant_name = Some(merchant_name.into());
        self
    }

    pub fn with_location(mut self, location: TransactionLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.location.lat = Some(lat);
        self.location.lon = Some(lon);
        self
    }

    pub fn with_payment(
        mut self,
        channel: Option<&str>,
        method: Option<&str>,
        processor: Option<&str>,
    ) -> Self {
        self.payment_channel = channel.map(str::to_string);
        self.payment_method = method.map(str::to_string);
        self.payment_processor = processor.map(str::to_string);
        self
    }

    /// Merchant name when the feed supplied a non-blank one, else the display name
    pub fn merchant_or_name(&self) -> &str {
        self.merchant_name
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.name)
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }
}
