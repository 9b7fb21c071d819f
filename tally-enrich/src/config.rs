//! Static tables driving merchant cleanup and type inference.
//!
//! Defaults are compiled in. A TOML file with the same shape replaces them
//! wholesale (a table that is present overrides, a missing one keeps the default):
//!
//! ```toml
//! [[synonyms]]
//! variant = "STBCKS"
//! canonical = "STARBUCKS"
//!
//! [[merchant_types]]
//! merchant_type = "gas_station"
//! name_keywords = ["shell", "exxon"]
//! location_keywords = ["gas", "fuel"]
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tally_core::MerchantType;

/// Raw-variant to canonical merchant spelling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Synonym {
    pub variant: String,
    pub canonical: String,
}

/// Keyword lists for one merchant type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeKeywords {
    pub merchant_type: MerchantType,
    /// Matched against the display name and merchant name
    #[serde(default)]
    pub name_keywords: Vec<String>,
    /// Matched against the formatted location string
    #[serde(default)]
    pub location_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Applied in order; see `MerchantNameCleaner::normalize`
    pub synonyms: Vec<Synonym>,
    pub merchant_types: Vec<TypeKeywords>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            synonyms: default_synonyms(),
            merchant_types: default_merchant_types(),
        }
    }
}

impl EnrichmentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: EnrichmentConfig = toml::from_str(s).context("parse enrichment tables")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let p = path.as_ref();
        let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
        Self::from_toml_str(&s).with_context(|| format!("load {}", p.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize enrichment tables")
    }

    pub fn validate(&self) -> Result<()> {
        for s in &self.synonyms {
            if s.variant.trim().is_empty() {
                bail!("synonym for '{}' has an empty variant", s.canonical);
            }
        }

        let mut seen = HashSet::new();
        for t in &self.merchant_types {
            if t.merchant_type == MerchantType::Unknown {
                bail!("'unknown' is the fallback type and cannot have keywords");
            }
            if !seen.insert(t.merchant_type) {
                bail!("duplicate keyword table for {}", t.merchant_type);
            }
        }
        Ok(())
    }
}

fn synonym(variant: &str, canonical: &str) -> Synonym {
    Synonym {
        variant: variant.to_string(),
        canonical: canonical.to_string(),
    }
}

fn keywords(merchant_type: MerchantType, names: &[&str], locations: &[&str]) -> TypeKeywords {
    TypeKeywords {
        merchant_type,
        name_keywords: names.iter().map(|s| s.to_string()).collect(),
        location_keywords: locations.iter().map(|s| s.to_string()).collect(),
    }
}

// No canonical form may contain a variant, and no variant may contain another,
// otherwise normalizing twice would keep rewriting it.
fn default_synonyms() -> Vec<Synonym> {
    vec![
        synonym("AMZN", "AMAZON"),
        synonym("STBCKS", "STARBUCKS"),
        synonym("SBUX", "STARBUCKS"),
        synonym("WAL-MART", "WALMART"),
        synonym("WM SUPERCENTER", "WALMART"),
        synonym("MCDONALD'S", "MCDONALDS"),
        synonym("DUNKIN DONUTS", "DUNKIN"),
        synonym("TRADER JOE S", "TRADER JOES"),
        synonym("7 ELEVEN", "7-ELEVEN"),
        synonym("NFLX", "NETFLIX"),
        synonym("UBER *EATS", "UBER EATS"),
    ]
}

fn default_merchant_types() -> Vec<TypeKeywords> {
    vec![
        keywords(
            MerchantType::GasStation,
            &["shell", "exxon", "mobil", "chevron"],
            &["gas", "fuel"],
        ),
        keywords(
            MerchantType::GroceryStore,
            &["safeway", "kroger", "whole foods", "trader joe"],
            &["grocery", "supermarket"],
        ),
        keywords(
            MerchantType::Restaurant,
            &["restaurant", "bistro", "grill", "diner", "pizza"],
            &["restaurant"],
        ),
        keywords(
            MerchantType::CoffeeShop,
            &["starbucks", "dunkin", "coffee", "cafe"],
            &["coffee", "cafe"],
        ),
        keywords(
            MerchantType::OnlineRetailer,
            &["amazon", "amzn", "ebay", "etsy"],
            &[],
        ),
        keywords(
            MerchantType::StreamingService,
            &["netflix", "spotify", "hulu", "disney+", "hbo max"],
            &[],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = EnrichmentConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.merchant_types.len(), 6);
    }

    #[test]
    fn test_canonical_never_contains_a_variant() {
        let cfg = EnrichmentConfig::default();
        for s in &cfg.synonyms {
            for other in &cfg.synonyms {
                assert!(
                    !s.canonical.contains(&other.variant),
                    "{} contains {}",
                    s.canonical,
                    other.variant
                );
            }
        }
    }

    #[test]
    fn test_no_variant_overlaps_another() {
        let cfg = EnrichmentConfig::default();
        for (i, s) in cfg.synonyms.iter().enumerate() {
            for (j, other) in cfg.synonyms.iter().enumerate() {
                if i != j {
                    assert!(
                        !s.variant.contains(&other.variant),
                        "{} contains {}",
                        s.variant,
                        other.variant
                    );
                }
            }
        }
    }

    #[test]
    fn test_toml_overrides_synonyms_only() {
        let cfg = EnrichmentConfig::from_toml_str(
            r#"
[[synonyms]]
variant = "PEETS"
canonical = "PEET'S COFFEE"
"#,
        )
        .unwrap();
        assert_eq!(cfg.synonyms, vec![synonym("PEETS", "PEET'S COFFEE")]);
        assert_eq!(cfg.merchant_types, default_merchant_types());
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let cfg = EnrichmentConfig::default();
        let s = cfg.to_toml_string().unwrap();
        assert_eq!(EnrichmentConfig::from_toml_str(&s).unwrap(), cfg);
    }

    #[test]
    fn test_rejects_unknown_and_duplicates() {
        let unknown = r#"
[[merchant_types]]
merchant_type = "unknown"
name_keywords = ["x"]
"#;
        assert!(EnrichmentConfig::from_toml_str(unknown).is_err());

        let dup = r#"
[[merchant_types]]
merchant_type = "restaurant"
name_keywords = ["a"]

[[merchant_types]]
merchant_type = "restaurant"
name_keywords = ["b"]
"#;
        assert!(EnrichmentConfig::from_toml_str(dup).is_err());
    }

    #[test]
    fn test_rejects_empty_variant() {
        let s = r#"
[[synonyms]]
variant = " "
canonical = "X"
"#;
        assert!(EnrichmentConfig::from_toml_str(s).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables.toml");
        fs::write(&path, "[[synonyms]]\nvariant = \"CSTCO\"\ncanonical = \"COSTCO\"\n").unwrap();
        let cfg = EnrichmentConfig::load(&path).unwrap();
        assert_eq!(cfg.synonyms[0].canonical, "COSTCO");
        assert!(EnrichmentConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
