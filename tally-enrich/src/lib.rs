//! tally-enrich: merchant cleanup, location context, merchant typing, rule routing
//! and classifier context for raw bank transactions

pub mod ai_context;
pub mod cleaner;
pub mod config;
pub mod enricher;
pub mod features;
pub mod location;
pub mod merchant_type;
pub mod router;

pub use ai_context::AIContextBuilder;
pub use cleaner::MerchantNameCleaner;
pub use config::{EnrichmentConfig, Synonym, TypeKeywords};
pub use enricher::Enricher;
pub use features::MerchantFeatureExtractor;
pub use location::format_location;
pub use merchant_type::MerchantTypeClassifier;
pub use router::CategorizationRouter;
