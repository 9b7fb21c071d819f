//! tally-core: transaction view, enrichment output types and geohash encoding

pub mod enrichment;
pub mod geohash;
pub mod transaction;

pub use enrichment::{
    AmountContext, CategorizationDecision, CleanedMerchant, EnrichedTransaction, Enrichment,
    LocationContext, MerchantFeatures, MerchantType, RuleCategory, UNKNOWN, UNKNOWN_LOCATION,
};
pub use transaction::{RawTransactionView, TransactionLocation};
