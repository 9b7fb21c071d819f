//! Classifier-ready text block for transactions no rule could settle.
//!
//! The block is the only thing handed to the external classifier; nothing here
//! parses or validates what comes back.

use tally_core::{CleanedMerchant, LocationContext, MerchantFeatures, RawTransactionView};

use crate::cleaner::MerchantNameCleaner;
use crate::features::MerchantFeatureExtractor;
use crate::location::format_location;

#[derive(Debug, Clone)]
pub struct AIContextBuilder {
    cleaner: MerchantNameCleaner,
    extractor: MerchantFeatureExtractor,
}

impl AIContextBuilder {
    pub fn new(cleaner: MerchantNameCleaner, extractor: MerchantFeatureExtractor) -> Self {
        Self { cleaner, extractor }
    }

    pub fn build(&self, txn: &RawTransactionView) -> String {
        let merchant = self.cleaner.clean(txn.merchant_or_name());
        let location = format_location(txn);
        let features = self.extractor.extract_with_location(txn, &location);
        render(txn, &merchant, &location, &features)
    }
}

/// Render from parts the caller already computed
pub fn render(
    txn: &RawTransactionView,
    merchant: &CleanedMerchant,
    location: &LocationContext,
    features: &MerchantFeatures,
) -> String {
    let coordinates = if location.coordinates.is_empty() {
        "Unknown"
    } else {
        location.coordinates.as_str()
    };

    [
        format!("Merchant: \"{}\"", merchant.normalized),
        format!("Location: {}", location.formatted),
        format!("Coordinates: {coordinates}"),
        format!("Amount: ${}", txn.abs_amount()),
        format!("Payment: {}", features.payment_context),
        format!("Type: {}", features.merchant_type),
        format!("Geohash: {}", features.geohash),
    ]
    .join("\n")
}
