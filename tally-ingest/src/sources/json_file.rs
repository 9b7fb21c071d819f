use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use tally_core::RawTransactionView;

use crate::source::TransactionSource;

/// JSON array of transactions, in the serde shape of [`RawTransactionView`]
#[derive(Debug, Clone)]
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TransactionSource for JsonSource {
    fn fetch(&self) -> Result<Vec<RawTransactionView>> {
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        let txns: Vec<RawTransactionView> = serde_json::from_str(&s)
            .with_context(|| format!("parse {}", self.path.display()))?;
        debug!(count = txns.len(), path = %self.path.display(), "loaded json transactions");
        Ok(txns)
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}
