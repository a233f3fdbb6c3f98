//! Row and credential storage.
//!
//! This module provides the storage layer for the intake pipeline:
//!
//! - The [`RowStore`] trait with SQLite and in-memory implementations
//! - OS keychain integration for the API key and Gmail OAuth credentials
//! - Async-safe database operations via tokio::task::spawn_blocking

mod database;
mod keychain;
mod memory;
mod row_store;
mod schema;
mod sqlite;

pub use database::Database;
pub use keychain::{KeychainAccess, KeychainError};
pub use memory::MemoryRowStore;
pub use row_store::{align, header_from, Result, RowStore, StoreError};
pub use sqlite::SqliteRowStore;
