use chrono::NaiveDate;
use tally_core::{
    AmountContext, CategorizationDecision, MerchantType, RawTransactionView, RuleCategory,
    TransactionLocation,
};
use tally_enrich::{Enricher, EnrichmentConfig, format_location};

fn txn(id: &str, name: &str, amount: f64) -> RawTransactionView {
    let date = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
    RawTransactionView::new(id, "checking-01", date, amount, name)
}

fn enricher() -> Enricher {
    Enricher::with_defaults().unwrap()
}

/// Cheap fill-up at a gas station: rule fires, no coordinates.
#[test]
fn test_shell_snack_purchase() {
    let e = enricher();
    let t = txn("t-shell", "SHELL OIL 4821", -12.50);

    let out = e.enrich(&t);
    let features = &out.enriched.merchant_features;
    assert_eq!(features.merchant_type, MerchantType::GasStation);
    assert_eq!(features.geohash, "unknown");
    assert_eq!(features.amount_context, AmountContext::Expense);

    assert!(e.router().should_use_rules(&t));
    assert_eq!(
        e.router().apply_rules(&t),
        Some(RuleCategory::new("Gas Station Snacks", "Food & Dining"))
    );
    assert_eq!(
        e.route(&t),
        CategorizationDecision::Rule(RuleCategory::new("Gas Station Snacks", "Food & Dining"))
    );
}

#[test]
fn test_netflix_streaming_rule() {
    let e = enricher();
    let t = txn("t-netflix", "NETFLIX.COM", -15.99);

    assert_eq!(
        e.enrich(&t).enriched.merchant_features.merchant_type,
        MerchantType::StreamingService
    );
    assert_eq!(
        e.router().apply_rules(&t),
        Some(RuleCategory::new("Streaming Services", "Entertainment"))
    );
}

/// Restaurants have no deterministic rule and must be escalated.
#[test]
fn test_bistro_escalates_with_context() {
    let e = enricher();
    let t = txn("t-bistro", "Joe's Bistro", -45.00);

    let out = e.enrich(&t);
    assert_eq!(out.enriched.merchant_features.merchant_type, MerchantType::Restaurant);
    assert_eq!(e.router().apply_rules(&t), None);

    match e.route(&t) {
        CategorizationDecision::Escalate { ai_context } => {
            assert_eq!(ai_context, out.enriched.ai_context);
            assert!(ai_context.starts_with("Merchant: \"JOE'S BISTRO\""));
            assert!(ai_context.contains("Type: restaurant"));
        }
        other => panic!("expected escalation, got {other:?}"),
    }
}

#[test]
fn test_synonym_collapsing_through_pipeline() {
    let t = txn("t-sbux", "STBCKS #4521 SEATTLE WA", -5.10);
    let merchant = enricher().enrich(&t).enriched.cleaned_merchant;
    assert!(merchant.normalized.contains("STARBUCKS"));
    assert!(!merchant.normalized.contains("STBCKS"));
}

#[test]
fn test_clean_idempotent_via_enricher() {
    let e = enricher();
    for name in ["STBCKS #4521 SEATTLE WA", "Trader Joe's #552 2026-02-01", "WM SUPERCENTER #1234"] {
        let first = e.cleaner().clean(name);
        let second = e.cleaner().clean(&first.normalized);
        assert_eq!(second.normalized, first.normalized, "{name}");
    }
}

#[test]
fn test_location_fallback() {
    let t = txn("t-none", "ACME", -1.0);
    assert_eq!(format_location(&t).formatted, "Unknown Location");
}

#[test]
fn test_rules_absent_for_unknown_online_restaurant() {
    let e = enricher();
    for name in ["ZXQ HOLDINGS", "ETSY.COM", "Pizza Palace"] {
        let t = txn("t", name, -30.0);
        assert_eq!(e.router().apply_rules(&t), None, "{name}");
        assert!(e.route(&t).is_escalation(), "{name}");
    }
}

#[test]
fn test_geohash_in_features() {
    let t = txn("t-geo", "KROGER #331", -64.10).with_location(TransactionLocation {
        city: Some("Taiyuan".to_string()),
        lat: Some(37.8324),
        lon: Some(112.5584),
        ..Default::default()
    });
    let out = enricher().enrich(&t);
    assert_eq!(out.enriched.merchant_features.geohash, "ww8p1r");
    assert_eq!(out.enriched.location_context.coordinates, "37.8324, 112.5584");
    assert!(out.enriched.ai_context.ends_with("Geohash: ww8p1r"));
}

#[test]
fn test_custom_tables_change_routing() {
    let cfg = EnrichmentConfig::from_toml_str(
        r#"
[[merchant_types]]
merchant_type = "grocery_store"
name_keywords = ["h-e-b"]
location_keywords = []
"#,
    )
    .unwrap();
    let e = Enricher::new(&cfg).unwrap();
    let t = txn("t-heb", "H-E-B #455 SAN MARCOS TX", -82.0);
    assert_eq!(
        e.route(&t).rule(),
        Some(&RuleCategory::new("Groceries", "Food & Dining"))
    );
    // default gas keywords are gone with the override
    assert_eq!(e.router().apply_rules(&txn("t", "SHELL", -5.0)), None);
}

#[test]
fn test_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Enricher>();

    let owned = enricher();
    let e = &owned;
    let batch: Vec<RawTransactionView> = (0..64)
        .map(|i| {
            let name = if i % 2 == 0 { "SAFEWAY" } else { "Joe's Bistro" };
            txn(&format!("t{i}"), name, -(i as f64))
        })
        .collect();

    let sequential = e.enrich_all(&batch);
    let parallel: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = batch
            .chunks(16)
            .map(|chunk| s.spawn(move || e.enrich_all(chunk)))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    assert_eq!(parallel, sequential);
}

#[test]
fn test_enriched_json_shape() {
    let out = enricher().enrich(&txn("t-json", "HULU 877-8244858", -7.99));
    let v = serde_json::to_value(&out).unwrap();
    assert_eq!(v["id"], "t-json");
    assert_eq!(v["enriched"]["merchant_features"]["merchant_type"], "streaming_service");
    assert_eq!(v["enriched"]["merchant_features"]["amount_context"], "expense");
    assert_eq!(v["enriched"]["cleaned_merchant"]["cleaned"], "HULU 877-");
}
