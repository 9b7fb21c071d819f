use tally_core::{
    AmountContext, LocationContext, MerchantFeatures, RawTransactionView, UNKNOWN, geohash,
};

use crate::location::format_location;
use crate::merchant_type::MerchantTypeClassifier;

/// Bundles geohash, merchant type, location and payment context for one transaction
#[derive(Debug, Clone)]
pub struct MerchantFeatureExtractor {
    classifier: MerchantTypeClassifier,
}

impl MerchantFeatureExtractor {
    pub fn new(classifier: MerchantTypeClassifier) -> Self {
        Self { classifier }
    }

    pub fn extract(&self, txn: &RawTransactionView) -> MerchantFeatures {
        self.extract_with_location(txn, &format_location(txn))
    }

    pub fn extract_with_location(
        &self,
        txn: &RawTransactionView,
        location: &LocationContext,
    ) -> MerchantFeatures {
        MerchantFeatures {
            geohash: geohash::encode(txn.location.lat, txn.location.lon),
            merchant_type: self.classifier.infer_with_location(txn, &location.formatted),
            location_context: location.formatted.clone(),
            payment_context: payment_context(txn),
            amount_context: AmountContext::from_amount(txn.amount),
        }
    }
}

/// `"<channel> | <method> | <processor>"`, missing parts as `"unknown"`
pub fn payment_context(txn: &RawTransactionView) -> String {
    [
        &txn.payment_channel,
        &txn.payment_method,
        &txn.payment_processor,
    ]
    .into_iter()
    .map(|v| v.as_deref().unwrap_or(UNKNOWN))
    .collect::<Vec<_>>()
    .join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnrichmentConfig;
    use chrono::NaiveDate;
    use tally_core::MerchantType;

    fn extractor() -> MerchantFeatureExtractor {
        MerchantFeatureExtractor::new(MerchantTypeClassifier::new(
            EnrichmentConfig::default().merchant_types,
        ))
    }

    fn txn(name: &str, amount: f64) -> RawTransactionView {
        let date = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        RawTransactionView::new("t1", "chk", date, amount, name)
    }

    #[test]
    fn test_payment_context_defaults() {
        assert_eq!(payment_context(&txn("X", -1.0)), "unknown | unknown | unknown");
        let t = txn("X", -1.0).with_payment(Some("in store"), None, Some("square"));
        assert_eq!(payment_context(&t), "in store | unknown | square");
    }

    #[test]
    fn test_extract_with_coordinates() {
        let t = txn("Starbucks", -5.25).with_coordinates(37.8324, 112.5584);
        let f = extractor().extract(&t);
        assert_eq!(f.geohash, "ww8p1r");
        assert_eq!(f.merchant_type, MerchantType::CoffeeShop);
        assert_eq!(f.location_context, "Unknown Location");
        assert_eq!(f.amount_context, AmountContext::Expense);
    }

    #[test]
    fn test_zero_amount_is_income() {
        let f = extractor().extract(&txn("REFUND ADJUSTMENT", 0.0));
        assert_eq!(f.amount_context, AmountContext::Income);
        assert_eq!(f.geohash, "unknown");
    }
}
