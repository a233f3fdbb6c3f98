//! SQLite-backed row store.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;

use super::database::Database;
use super::row_store::{align, header_from, to_record, Result, RowStore};
use crate::domain::Record;

/// Row store persisted in the `sheet_header` and `sheet_rows` tables.
#[derive(Debug, Clone)]
pub struct SqliteRowStore {
    db: Database,
}

impl SqliteRowStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens (or creates) the store at `path`.
    pub async fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?))
    }

    pub async fn in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }
}

fn read_header(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sheet_header ORDER BY position")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(names)
}

#[async_trait]
impl RowStore for SqliteRowStore {
    async fn header(&self) -> Result<Vec<String>> {
        self.db.with_conn(read_header).await
    }

    async fn append(&self, record: &Record) -> Result<()> {
        let record = record.clone();

        self.db
            .transaction(move |tx| {
                let mut header = read_header(tx)?;
                if header.is_empty() {
                    header = header_from(&record);
                    for (position, name) in header.iter().enumerate() {
                        tx.execute(
                            "INSERT INTO sheet_header (position, name) VALUES (?1, ?2)",
                            params![position as i64, name],
                        )?;
                    }
                    tracing::info!(columns = header.len(), "Established row store header");
                }

                let cells = serde_json::to_string(&align(&header, &record))?;
                tx.execute(
                    "INSERT INTO sheet_rows (cells, appended_at) VALUES (?1, ?2)",
                    params![cells, Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
    }

    async fn rows(&self) -> Result<Vec<Record>> {
        self.db
            .with_conn(|conn| {
                let header = read_header(conn)?;
                let mut stmt = conn.prepare("SELECT cells FROM sheet_rows ORDER BY id")?;
                let raw = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?;

                raw.iter()
                    .map(|cells| -> Result<Record> {
                        let cells: Vec<Value> = serde_json::from_str(cells)?;
                        Ok(to_record(&header, cells))
                    })
                    .collect()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[tokio::test]
    async fn first_append_establishes_header() {
        let store = SqliteRowStore::in_memory().await.unwrap();
        assert!(store.header().await.unwrap().is_empty());

        store
            .append(&record(json!({"Property Address": "1 A St", "Offer Price": 1})))
            .await
            .unwrap();

        assert_eq!(
            store.header().await.unwrap(),
            vec!["Property Address".to_string(), "Offer Price".to_string()]
        );
    }

    #[tokio::test]
    async fn later_appends_align_to_header() {
        let store = SqliteRowStore::in_memory().await.unwrap();
        store
            .append(&record(json!({"Property Address": "1 A St", "Offer Price": 1})))
            .await
            .unwrap();
        store
            .append(&record(json!({"Offer Price": 500000, "Extra": true})))
            .await
            .unwrap();

        let rows = store.rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Property Address"], json!(""));
        assert_eq!(rows[1]["Offer Price"], json!(500000));
        assert!(!rows[1].contains_key("Extra"));
    }

    #[tokio::test]
    async fn rows_are_oldest_first() {
        let store = SqliteRowStore::in_memory().await.unwrap();
        for n in 0..3 {
            store.append(&record(json!({"N": n}))).await.unwrap();
        }

        let values: Vec<Value> = store
            .rows()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r["N"].clone())
            .collect();
        assert_eq!(values, vec![json!(0), json!(1), json!(2)]);
    }

    #[tokio::test]
    async fn address_match_is_normalized() {
        let store = SqliteRowStore::in_memory().await.unwrap();
        store
            .append(&record(json!({"Property Address": "123 Main St, Atlanta, GA"})))
            .await
            .unwrap();

        let hits = store
            .rows_matching_address("  123 MAIN ST, atlanta, ga ")
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(store.rows_matching_address("9 Elm").await.unwrap().is_empty());
    }
}
