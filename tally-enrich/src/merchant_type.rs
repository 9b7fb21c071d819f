//! Heuristic merchant-type inference from names and the formatted location.

use tally_core::{MerchantType, RawTransactionView};

use crate::config::TypeKeywords;
use crate::location::format_location;

/// Fixed evaluation order; earlier types win when several keyword sets match.
const PRECEDENCE: [MerchantType; 6] = [
    MerchantType::GasStation,
    MerchantType::GroceryStore,
    MerchantType::Restaurant,
    MerchantType::CoffeeShop,
    MerchantType::OnlineRetailer,
    MerchantType::StreamingService,
];

fn precedence(t: MerchantType) -> usize {
    PRECEDENCE
        .iter()
        .position(|p| *p == t)
        .unwrap_or(PRECEDENCE.len())
}

#[derive(Debug, Clone)]
pub struct MerchantTypeClassifier {
    tables: Vec<TypeKeywords>,
}

impl MerchantTypeClassifier {
    pub fn new(mut tables: Vec<TypeKeywords>) -> Self {
        tables.sort_by_key(|t| precedence(t.merchant_type));
        for t in &mut tables {
            lowercase_all(&mut t.name_keywords);
            lowercase_all(&mut t.location_keywords);
        }
        Self { tables }
    }

    pub fn infer(&self, txn: &RawTransactionView) -> MerchantType {
        let location = format_location(txn).formatted;
        self.infer_with_location(txn, &location)
    }

    /// Same as [`infer`](Self::infer) when the caller already formatted the location
    pub fn infer_with_location(&self, txn: &RawTransactionView, formatted_location: &str) -> MerchantType {
        let name = txn.name.to_lowercase();
        let merchant = txn.merchant_name.as_deref().unwrap_or("").to_lowercase();
        let location = formatted_location.to_lowercase();

        for t in &self.tables {
            let name_hit = t
                .name_keywords
                .iter()
                .any(|k| name.contains(k.as_str()) || merchant.contains(k.as_str()));
            let location_hit = t.location_keywords.iter().any(|k| location.contains(k.as_str()));
            if name_hit || location_hit {
                return t.merchant_type;
            }
        }

        MerchantType::Unknown
    }
}

fn lowercase_all(words: &mut Vec<String>) {
    words.retain(|w| !w.trim().is_empty());
    for w in words.iter_mut() {
        *w = w.to_lowercase();
    }
}
