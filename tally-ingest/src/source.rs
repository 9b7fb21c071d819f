use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use tally_core::RawTransactionView;

use crate::sources::{CsvSource, JsonSource};

/// Anything that can hand the pipeline a batch of transactions.
///
/// The persistence/sync layer owns the real implementation; the file-backed
/// sources here cover exports and fixtures.
pub trait TransactionSource: Send + Sync {
    fn fetch(&self) -> Result<Vec<RawTransactionView>>;

    /// Short label for logs
    fn describe(&self) -> String;
}

/// Pick a source by file extension (`.csv`, `.json`)
pub fn source_for_path(path: impl AsRef<Path>) -> Result<Box<dyn TransactionSource>> {
    let path: PathBuf = path.as_ref().to_path_buf();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvSource::new(path))),
        "json" => Ok(Box::new(JsonSource::new(path))),
        _ => bail!(
            "unsupported transaction file {} (expected .csv or .json)",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_for_path_by_extension() {
        assert!(source_for_path("export.csv").unwrap().describe().starts_with("csv:"));
        assert!(source_for_path("EXPORT.JSON").unwrap().describe().starts_with("json:"));
        assert!(source_for_path("export.ofx").is_err());
        assert!(source_for_path("no_extension").is_err());
    }
}
