//! tally-ingest: transaction-fetch interface and file-backed sources.

pub mod source;
pub mod sources;

pub use source::{TransactionSource, source_for_path};
pub use sources::{CsvSource, JsonSource};
