//! Merchant name cleanup: strip bank noise, then collapse known spelling variants.

use anyhow::Result;
use regex::Regex;

use tally_core::CleanedMerchant;

use crate::config::Synonym;

#[derive(Debug, Clone)]
pub struct MerchantNameCleaner {
    iso_date: Regex,
    us_date: Regex,
    reference_id: Regex,
    country_code: Regex,
    legal_suffix: Regex,
    synonyms: Vec<Synonym>,
}

impl MerchantNameCleaner {
    pub fn new(synonyms: Vec<Synonym>) -> Result<Self> {
        Ok(Self {
            iso_date: Regex::new(r"\d{4}-\d{2}-\d{2}")?,
            us_date: Regex::new(r"\d{2}/\d{2}/\d{4}")?,
            reference_id: Regex::new(r"\d{5,}")?,
            // "US 1234" / "1234 US"
            country_code: Regex::new(r"(?i)\b[A-Z]{2}\s?\d{4}\b|\b\d{4}\s?[A-Z]{2}\b")?,
            // stacked suffixes ("FOO CORP LLC") go in one pass
            legal_suffix: Regex::new(r"(?i)(?:[\s,]+(?:CO|USA|LLC|INC|CORP|LTD)\.?)+\s*$")?,
            synonyms,
        })
    }

    pub fn clean(&self, merchant_or_name: &str) -> CleanedMerchant {
        let trimmed = merchant_or_name.trim();
        if trimmed.is_empty() {
            return CleanedMerchant::default();
        }

        // Removed spans become a space so neighbouring tokens never fuse.
        let s = self.iso_date.replace_all(trimmed, " ");
        let s = self.us_date.replace_all(&s, " ");
        let s = self.reference_id.replace_all(&s, " ");
        let s = self.country_code.replace_all(&s, " ");
        let s = self.legal_suffix.replace(&s, "");
        let cleaned = collapse_whitespace(&s).to_uppercase();

        let normalized = self.normalize(&cleaned);

        CleanedMerchant {
            original: merchant_or_name.to_string(),
            cleaned,
            normalized,
        }
    }

    /// Synonym substitution over an already-cleaned name.
    ///
    /// Every occurrence of a matching variant is replaced.
    ///
    /// Quirk kept from the dashboard: every matching entry rewrites `cleaned`
    /// from scratch, so only the last match in table order survives. Earlier
    /// matches are discarded, not chained.
    pub fn normalize(&self, cleaned: &str) -> String {
        let mut normalized = cleaned.to_string();
        for s in &self.synonyms {
            if cleaned.contains(s.variant.as_str()) {
                normalized = cleaned.replace(s.variant.as_str(), &s.canonical);
            }
        }
        normalized
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
