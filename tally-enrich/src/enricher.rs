//! Pipeline entry point: clean → locate → extract features → render context.
//!
//! `Enricher` only holds immutable tables, so one instance can be shared across
//! threads and called for any number of transactions in any order.

use anyhow::Result;
use tracing::{debug, info};

use tally_core::{CategorizationDecision, EnrichedTransaction, Enrichment, RawTransactionView};

use crate::ai_context::{self, AIContextBuilder};
use crate::cleaner::MerchantNameCleaner;
use crate::config::EnrichmentConfig;
use crate::features::MerchantFeatureExtractor;
use crate::location::format_location;
use crate::merchant_type::MerchantTypeClassifier;
use crate::router::{self, CategorizationRouter};

#[derive(Debug, Clone)]
pub struct Enricher {
    cleaner: MerchantNameCleaner,
    extractor: MerchantFeatureExtractor,
    router: CategorizationRouter,
    context_builder: AIContextBuilder,
}

impl Enricher {
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        config.validate()?;
        let cleaner = MerchantNameCleaner::new(config.synonyms.clone())?;
        let classifier = MerchantTypeClassifier::new(config.merchant_types.clone());
        let extractor = MerchantFeatureExtractor::new(classifier.clone());

        Ok(Self {
            router: CategorizationRouter::new(classifier),
            context_builder: AIContextBuilder::new(cleaner.clone(), extractor.clone()),
            cleaner,
            extractor,
        })
    }

    /// Enricher over the compiled-in tables
    pub fn with_defaults() -> Result<Self> {
        Self::new(&EnrichmentConfig::default())
    }

    pub fn enrich(&self, txn: &RawTransactionView) -> EnrichedTransaction {
        let cleaned_merchant = self.cleaner.clean(txn.merchant_or_name());
        let location_context = format_location(txn);
        let merchant_features = self.extractor.extract_with_location(txn, &location_context);
        let ai_context =
            ai_context::render(txn, &cleaned_merchant, &location_context, &merchant_features);

        debug!(
            id = %txn.id,
            merchant = %cleaned_merchant.normalized,
            merchant_type = %merchant_features.merchant_type,
            geohash = %merchant_features.geohash,
            "enriched transaction"
        );

        EnrichedTransaction {
            transaction: txn.clone(),
            enriched: Enrichment {
                cleaned_merchant,
                location_context,
                merchant_features,
                ai_context,
            },
        }
    }

    /// Enrich a batch, preserving input order
    pub fn enrich_all(&self, txns: &[RawTransactionView]) -> Vec<EnrichedTransaction> {
        let out: Vec<EnrichedTransaction> = txns.iter().map(|t| self.enrich(t)).collect();
        info!(count = out.len(), "enriched batch");
        out
    }

    /// Rule category when the gate and rules agree, else the classifier context
    pub fn route(&self, txn: &RawTransactionView) -> CategorizationDecision {
        self.router.decide(txn, || self.context_builder.build(txn))
    }

    /// Decision for an already-enriched record, without re-running the pipeline
    pub fn route_enriched(&self, enriched: &EnrichedTransaction) -> CategorizationDecision {
        router::decide_for(
            enriched.enriched.merchant_features.merchant_type,
            &enriched.transaction,
            || enriched.enriched.ai_context.clone(),
        )
    }

    pub fn router(&self) -> &CategorizationRouter {
        &self.router
    }

    pub fn context_builder(&self) -> &AIContextBuilder {
        &self.context_builder
    }

    pub fn cleaner(&self) -> &MerchantNameCleaner {
        &self.cleaner
    }
}
