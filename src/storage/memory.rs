//! In-memory row store.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::row_store::{align, header_from, to_record, Result, RowStore};
use crate::domain::Record;

#[derive(Debug, Default)]
struct Sheet {
    header: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Row store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    sheet: Mutex<Sheet>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RowStore for MemoryRowStore {
    async fn header(&self) -> Result<Vec<String>> {
        Ok(self.sheet.lock().await.header.clone())
    }

    async fn append(&self, record: &Record) -> Result<()> {
        let mut sheet = self.sheet.lock().await;
        if sheet.header.is_empty() {
            sheet.header = header_from(record);
        }
        let cells = align(&sheet.header, record);
        sheet.rows.push(cells);
        Ok(())
    }

    async fn rows(&self) -> Result<Vec<Record>> {
        let sheet = self.sheet.lock().await;
        Ok(sheet
            .rows
            .iter()
            .map(|cells| to_record(&sheet.header, cells.clone()))
            .collect())
    }
}
