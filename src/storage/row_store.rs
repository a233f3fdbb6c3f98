//! Row store trait and header alignment.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::{cell_text, normalize_address, ContractRow, Record};

/// Errors that can occur during row store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("corrupt stored row: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to spawn blocking task: {0}")]
    TaskFailed(String),
}

/// Result type for row store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// An append-only table of records with a header row.
///
/// The header is established by the first append to an empty store, taken
/// from the record's key order. Later appends are aligned by column name:
/// keys not in the header are dropped and missing columns become `""`.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Column names in order. Empty until the first append.
    async fn header(&self) -> Result<Vec<String>>;

    /// Appends one record.
    async fn append(&self, record: &Record) -> Result<()>;

    /// All rows, oldest first, keyed by header name.
    async fn rows(&self) -> Result<Vec<Record>>;

    /// Rows whose address column matches `address` after normalization.
    async fn rows_matching_address(&self, address: &str) -> Result<Vec<Record>> {
        let wanted = normalize_address(address);
        Ok(self
            .rows()
            .await?
            .into_iter()
            .filter(|row| {
                normalize_address(&cell_text(row.get(ContractRow::ADDRESS_COLUMN))) == wanted
            })
            .collect())
    }
}

/// Header a store adopts from its first record.
pub fn header_from(record: &Record) -> Vec<String> {
    record.keys().cloned().collect()
}

/// Cells of `record` in `header` order.
pub fn align(header: &[String], record: &Record) -> Vec<Value> {
    header
        .iter()
        .map(|name| {
            record
                .get(name)
                .filter(|v| !v.is_null())
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()))
        })
        .collect()
}

/// Inverse of [`align`]: pairs stored cells with the header.
///
/// Short rows are padded with `""`.
pub fn to_record(header: &[String], cells: Vec<Value>) -> Record {
    let mut cells = cells.into_iter();
    header
        .iter()
        .map(|name| {
            let value = cells.next().unwrap_or_else(|| Value::String(String::new()));
            (name.clone(), value)
        })
        .collect()
}
