//! Deterministic category rules vs. escalation to an external classifier.
//!
//! Two entry points, deliberately not unified:
//! - `should_use_rules` gates on gas stations under $50, groceries, streaming.
//! - `apply_rules` also knows coffee shops and the pricier gas-station branch.
//!
//! So a coffee shop only gets a rule category when the caller skips the gate and
//! calls `apply_rules` directly. Whether the gate is intentionally narrower or just
//! stale is an open product question.

use tally_core::{CategorizationDecision, MerchantType, RawTransactionView, RuleCategory};
use tracing::debug;

use crate::merchant_type::MerchantTypeClassifier;

/// Below this absolute amount a gas-station purchase counts as snacks
pub const GAS_SNACK_LIMIT: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct CategorizationRouter {
    classifier: MerchantTypeClassifier,
}

impl CategorizationRouter {
    pub fn new(classifier: MerchantTypeClassifier) -> Self {
        Self { classifier }
    }

    pub fn should_use_rules(&self, txn: &RawTransactionView) -> bool {
        rules_gate(self.classifier.infer(txn), txn.amount)
    }

    pub fn apply_rules(&self, txn: &RawTransactionView) -> Option<RuleCategory> {
        rule_category(self.classifier.infer(txn), txn.amount)
    }

    /// Gate first, then rules; anything else escalates with the context from `build_context`.
    pub fn decide(
        &self,
        txn: &RawTransactionView,
        build_context: impl FnOnce() -> String,
    ) -> CategorizationDecision {
        decide_for(self.classifier.infer(txn), txn, build_context)
    }
}

pub(crate) fn decide_for(
    merchant_type: MerchantType,
    txn: &RawTransactionView,
    build_context: impl FnOnce() -> String,
) -> CategorizationDecision {
    if rules_gate(merchant_type, txn.amount) {
        if let Some(category) = rule_category(merchant_type, txn.amount) {
            debug!(id = %txn.id, %merchant_type, %category, "rule applied");
            return CategorizationDecision::Rule(category);
        }
    }
    debug!(id = %txn.id, %merchant_type, "escalating to classifier");
    CategorizationDecision::Escalate {
        ai_context: build_context(),
    }
}

pub fn rules_gate(merchant_type: MerchantType, amount: f64) -> bool {
    match merchant_type {
        MerchantType::GasStation => amount.abs() < GAS_SNACK_LIMIT,
        MerchantType::GroceryStore | MerchantType::StreamingService => true,
        _ => false,
    }
}

pub fn rule_category(merchant_type: MerchantType, amount: f64) -> Option<RuleCategory> {
    match merchant_type {
        MerchantType::GasStation if amount.abs() < GAS_SNACK_LIMIT => {
            Some(cat("Gas Station Snacks", "Food & Dining"))
        }
        MerchantType::GasStation => Some(cat("Gas Station", "Transportation")),
        MerchantType::GroceryStore => Some(cat("Groceries", "Food & Dining")),
        MerchantType::StreamingService => Some(cat("Streaming Services", "Entertainment")),
        MerchantType::CoffeeShop => Some(cat("Coffee Shops", "Food & Dining")),
        MerchantType::Restaurant | MerchantType::OnlineRetailer | MerchantType::Unknown => None,
    }
}

fn cat(granular: &str, general: &str) -> RuleCategory {
    RuleCategory::new(granular, general)
}
