//! Persistence gateway: the `Store` trait and its backends.
//!
//! Rows cross this boundary as [`Record`]s (JSON objects keyed by column name), so one
//! trait object serves every table. `PgStore` talks to PostgreSQL; `MemoryStore`
//! keeps rows in process and backs the test suite.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{connect, ensure_database_exists, PgStore};

use crate::error::AppError;
use crate::model::TableInfo;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One row as a JSON object keyed by column name.
pub type Record = Map<String, Value>;

pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

/// List parameters: exact-match filters (a `null` value matches NULL), then paging.
#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<(String, Value)>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            filters: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl ListQuery {
    pub fn filter(mut self, column: &str, value: Value) -> Self {
        self.filters.push((column.to_string(), value));
        self
    }

    /// Limit clamped to `MAX_LIMIT`.
    pub fn effective_limit(&self) -> u32 {
        self.limit.min(MAX_LIMIT)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Create missing tables and add missing columns. Never drops anything.
    async fn sync_schema(&self, tables: &[&'static TableInfo]) -> Result<(), AppError>;

    /// Insert one row; returns the stored row (with its generated key, if any).
    async fn insert(&self, table: &'static TableInfo, row: &Record) -> Result<Record, AppError>;

    /// Insert all rows or none.
    async fn insert_many(&self, table: &'static TableInfo, rows: &[Record]) -> Result<Vec<Record>, AppError>;

    async fn fetch(&self, table: &'static TableInfo, key: &Value) -> Result<Option<Record>, AppError>;

    /// Rows matching `query`, ordered by primary key.
    async fn list(&self, table: &'static TableInfo, query: &ListQuery) -> Result<Vec<Record>, AppError>;

    /// Overwrite the columns in `changes`; `None` when no row has `key`.
    async fn update(
        &self,
        table: &'static TableInfo,
        key: &Value,
        changes: &Record,
    ) -> Result<Option<Record>, AppError>;

    /// Remove the row; `false` when no row has `key`.
    async fn delete(&self, table: &'static TableInfo, key: &Value) -> Result<bool, AppError>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), AppError>;
}
