//! Output types of the enrichment pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::transaction::RawTransactionView;

/// Sentinel used wherever a value could not be derived
pub const UNKNOWN: &str = "unknown";

/// Fallback for [`LocationContext::formatted`] when no descriptive field is present
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Merchant name before and after cleanup
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CleanedMerchant {
    /// Untouched input
    pub original: String,
    /// Noise stripped, upper-cased, single-spaced
    pub cleaned: String,
    /// `cleaned` with synonym substitution applied
    pub normalized: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationContext {
    pub address: String,
    pub city: String,
    pub region: String,
    pub country: String,
    /// `"lat, lon"`, or empty when either coordinate is missing
    pub coordinates: String,
    /// Never empty
    pub formatted: String,
}

/// Coarse merchant classification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MerchantType {
    #[serde(rename = "gas_station")]
    GasStation,
    #[serde(rename = "grocery_store")]
    GroceryStore,
    #[serde(rename = "restaurant")]
    Restaurant,
    #[serde(rename = "coffee_shop")]
    CoffeeShop,
    #[serde(rename = "online_retailer")]
    OnlineRetailer,
    #[serde(rename = "streaming_service")]
    StreamingService,
    #[serde(rename = "unknown")]
    Unknown,
}

impl MerchantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MerchantType::GasStation => "gas_station",
            MerchantType::GroceryStore => "grocery_store",
            MerchantType::Restaurant => "restaurant",
            MerchantType::CoffeeShop => "coffee_shop",
            MerchantType::OnlineRetailer => "online_retailer",
            MerchantType::StreamingService => "streaming_service",
            MerchantType::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for MerchantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polarity of the amount. Zero counts as income.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AmountContext {
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "income")]
    Income,
}

impl AmountContext {
    // anything not negative is income, including 0.0
    pub fn from_amount(amount: f64) -> Self {
        if amount < 0.0 {
            AmountContext::Expense
        } else {
            AmountContext::Income
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AmountContext::Expense => "expense",
            AmountContext::Income => "income",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MerchantFeatures {
    /// 6-character geohash, or `"unknown"`
    pub geohash: String,
    pub merchant_type: MerchantType,
    pub location_context: String,
    /// `"<channel> | <method> | <processor>"`
    pub payment_context: String,
    pub amount_context: AmountContext,
}

/// Two-level category label produced by a deterministic rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RuleCategory {
    pub granular: String,
    pub general: String,
}

impl RuleCategory {
    pub fn new(granular: impl Into<String>, general: impl Into<String>) -> Self {
        Self {
            granular: granular.into(),
            general: general.into(),
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.general, self.granular)
    }
}

/// Either a rule fired, or the caller should hand `ai_context` to a classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum CategorizationDecision {
    Rule(RuleCategory),
    Escalate { ai_context: String },
}

impl CategorizationDecision {
    pub fn rule(&self) -> Option<&RuleCategory> {
        match self {
            CategorizationDecision::Rule(category) => Some(category),
            CategorizationDecision::Escalate { .. } => None,
        }
    }

    pub fn is_escalation(&self) -> bool {
        matches!(self, CategorizationDecision::Escalate { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Enrichment {
    pub cleaned_merchant: CleanedMerchant,
    pub location_context: LocationContext,
    pub merchant_features: MerchantFeatures,
    pub ai_context: String,
}

/// A transaction plus everything the pipeline derived from it.
/// Built fresh per call; the caller owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction: RawTransactionView,
    pub enriched: Enrichment,
}
