//! Command bodies, kept apart from argument parsing so they can be tested.

use anyhow::Result;
use std::io::Write;
use tracing::{info, warn};

use tally_core::{CategorizationDecision, EnrichedTransaction, RuleCategory};
use tally_enrich::Enricher;

use crate::classifier::Classifier;

/// Where a final category came from
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Rule(RuleCategory),
    Classifier(RuleCategory),
    /// Escalated but not sent (dry run)
    Pending,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub enriched: EnrichedTransaction,
    pub resolution: Resolution,
}

pub fn write_enriched(
    out: &mut impl Write,
    records: &[EnrichedTransaction],
    pretty: bool,
) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, records)?;
        writeln!(out)?;
    } else {
        for r in records {
            serde_json::to_writer(&mut *out, r)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn write_routes(
    out: &mut impl Write,
    enricher: &Enricher,
    records: &[EnrichedTransaction],
) -> Result<()> {
    for r in records {
        let merchant_type = r.enriched.merchant_features.merchant_type;
        match enricher.route_enriched(r) {
            CategorizationDecision::Rule(category) => writeln!(
                out,
                "{}\t{}\t{}\trule\t{}",
                r.transaction.id, r.enriched.cleaned_merchant.normalized, merchant_type, category
            )?,
            CategorizationDecision::Escalate { .. } => writeln!(
                out,
                "{}\t{}\t{}\tescalate",
                r.transaction.id, r.enriched.cleaned_merchant.normalized, merchant_type
            )?,
        }
    }
    Ok(())
}

/// Rules locally; everything else through `classifier`, one request at a time.
/// A failed request is logged and recorded, never fatal for the batch.
pub async fn classify_batch<C: Classifier>(
    enricher: &Enricher,
    records: Vec<EnrichedTransaction>,
    classifier: Option<&C>,
) -> Vec<Outcome> {
    let mut outcomes = Vec::with_capacity(records.len());
    let mut sent = 0usize;

    for enriched in records {
        let resolution = match enricher.route_enriched(&enriched) {
            CategorizationDecision::Rule(category) => Resolution::Rule(category),
            CategorizationDecision::Escalate { ai_context } => match classifier {
                None => Resolution::Pending,
                Some(c) => {
                    sent += 1;
                    match c.classify(&ai_context).await {
                        Ok(category) => Resolution::Classifier(category),
                        Err(e) => {
                            warn!(id = %enriched.transaction.id, error = %format!("{e:#}"), "classifier failed");
                            Resolution::Failed(format!("{e:#}"))
                        }
                    }
                }
            },
        };
        outcomes.push(Outcome { enriched, resolution });
    }

    info!(total = outcomes.len(), sent, "classification finished");
    outcomes
}

pub fn write_outcomes(out: &mut impl Write, outcomes: &[Outcome]) -> Result<()> {
    for o in outcomes {
        let id = &o.enriched.transaction.id;
        let merchant = &o.enriched.enriched.cleaned_merchant.normalized;
        match &o.resolution {
            Resolution::Rule(c) => writeln!(out, "{id}\t{merchant}\t{c}\t(rule)")?,
            Resolution::Classifier(c) => writeln!(out, "{id}\t{merchant}\t{c}\t(classifier)")?,
            Resolution::Pending => {
                writeln!(out, "{id}\t{merchant}\t-\t(escalate)")?;
                for line in o.enriched.enriched.ai_context.lines() {
                    writeln!(out, "    {line}")?;
                }
            }
            Resolution::Failed(e) => writeln!(out, "{id}\t{merchant}\t-\t(error: {e})")?,
        }
    }
    Ok(())
}
