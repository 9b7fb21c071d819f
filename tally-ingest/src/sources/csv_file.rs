//! CSV transaction exports.
//!
//! Columns are matched by header name (case-insensitive, any order):
//! id, account_id, date, amount, name are required; merchant_name, category,
//! address, city, region, country, lat, lon, payment_channel, payment_method,
//! payment_processor, personal_finance_category are optional.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use csv::StringRecord;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use tally_core::{RawTransactionView, TransactionLocation};

use crate::source::TransactionSource;

const REQUIRED: [&str; 5] = ["id", "account_id", "date", "amount", "name"];

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TransactionSource for CsvSource {
    fn fetch(&self) -> Result<Vec<RawTransactionView>> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let headers = rdr
            .headers()
            .with_context(|| format!("reading header of {}", self.path.display()))?
            .clone();
        let columns = Columns::from_headers(&headers)?;

        let mut txns = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            // +2: 1-based, and the header is line 1
            let line = i + 2;
            let record = result.with_context(|| format!("reading line {line}"))?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            let txn = columns
                .transaction(&record)
                .with_context(|| format!("{} line {line}", self.path.display()))?;
            txns.push(txn);
        }

        debug!(count = txns.len(), path = %self.path.display(), "loaded csv transactions");
        Ok(txns)
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let index: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_ascii_lowercase(), i))
            .collect();

        for name in REQUIRED {
            if !index.contains_key(name) {
                bail!("missing required column '{name}'");
            }
        }
        Ok(Self { index })
    }

    /// Non-empty cell for `name`, if the column exists
    fn get<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.index
            .get(name)
            .and_then(|&i| record.get(i))
            .filter(|cell| !cell.is_empty())
    }

    fn owned(&self, record: &StringRecord, name: &str) -> Option<String> {
        self.get(record, name).map(str::to_string)
    }

    fn required(&self, record: &StringRecord, name: &str) -> Result<String> {
        self.owned(record, name)
            .ok_or_else(|| anyhow!("empty '{name}'"))
    }

    fn coordinate(&self, record: &StringRecord, name: &str) -> Result<Option<f64>> {
        self.get(record, name)
            .map(|raw| raw.parse::<f64>().with_context(|| format!("invalid {name} '{raw}'")))
            .transpose()
    }

    fn transaction(&self, record: &StringRecord) -> Result<RawTransactionView> {
        let date_raw = self.required(record, "date")?;
        let date = parse_date(&date_raw).ok_or_else(|| anyhow!("invalid date '{date_raw}'"))?;

        let amount_raw = self.required(record, "amount")?;
        let amount = parse_amount(&amount_raw)
            .ok_or_else(|| anyhow!("invalid amount '{amount_raw}'"))?;

        Ok(RawTransactionView {
            id: self.required(record, "id")?,
            account_id: self.required(record, "account_id")?,
            date,
            amount,
            name: self.required(record, "name")?,
            merchant_name: self.owned(record, "merchant_name"),
            category: self.owned(record, "category"),
            location: TransactionLocation {
                address: self.owned(record, "address"),
                city: self.owned(record, "city"),
                region: self.owned(record, "region"),
                country: self.owned(record, "country"),
                lat: self.coordinate(record, "lat")?,
                lon: self.coordinate(record, "lon")?,
            },
            payment_channel: self.owned(record, "payment_channel"),
            payment_method: self.owned(record, "payment_method"),
            payment_processor: self.owned(record, "payment_processor"),
            personal_finance_category: self.owned(record, "personal_finance_category"),
        })
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .ok()
}

/// Accepts `-12.50`, `$1,200.00`, `-$4.25`
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned.trim().parse().ok()
}
