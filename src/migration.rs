//! Schema DDL from table metadata and the versioned migration step.
//!
//! The migration is recorded in `schema_migrations`: once `SCHEMA_VERSION` is present,
//! later runs do nothing. Tables are created if absent and missing columns are added;
//! nothing is dropped or altered in place.

use crate::entities::{ArInternalMetadata, Entity, SchemaMigration};
use crate::error::AppError;
use crate::model::{validate, ColumnInfo, TableInfo};
use crate::service::CrudService;
use crate::sql::quoted;
use crate::store::{Record, Store};
use serde_json::Value;

/// Version recorded in `schema_migrations` when the current table set is applied.
pub const SCHEMA_VERSION: &str = "20261016000000";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MigrationOutcome {
    Applied,
    UpToDate,
}

fn column_def(table: &TableInfo, c: &ColumnInfo) -> String {
    let mut def = format!("{} {}", quoted(c.name), c.column_type.pg_type());
    if c.primary_key && table.key_generated {
        def.push_str(" GENERATED BY DEFAULT AS IDENTITY");
    }
    if !c.nullable {
        def.push_str(" NOT NULL");
    }
    def
}

/// CREATE TABLE IF NOT EXISTS with every column and the primary key.
pub fn create_table_sql(table: &TableInfo) -> String {
    let mut col_defs: Vec<String> = table.columns.iter().map(|c| column_def(table, c)).collect();
    col_defs.push(format!("PRIMARY KEY ({})", quoted(table.primary_key)));
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n)",
        quoted(table.name),
        col_defs.join(",\n  ")
    )
}

/// ADD COLUMN IF NOT EXISTS for each non-key column, so older tables gain new columns.
/// Added columns are nullable: existing rows have no value for them.
pub fn add_columns_sql(table: &TableInfo) -> Vec<String> {
    table
        .columns
        .iter()
        .filter(|c| !c.primary_key)
        .map(|c| {
            format!(
                "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} {}",
                quoted(table.name),
                quoted(c.name),
                c.column_type.pg_type()
            )
        })
        .collect()
}

/// Full DDL for `tables`, in order.
pub fn schema_sql(tables: &[&TableInfo]) -> Vec<String> {
    let mut out = Vec::new();
    for t in tables {
        out.push(create_table_sql(t));
        out.extend(add_columns_sql(t));
    }
    out
}

/// Validate the catalog, bring the schema to `SCHEMA_VERSION` and record it.
/// Idempotent: a recorded version short-circuits.
pub async fn apply_migrations(
    store: &dyn Store,
    tables: &[&'static TableInfo],
    environment: &str,
) -> Result<MigrationOutcome, AppError> {
    validate(tables)?;

    store.sync_schema(&[SchemaMigration::TABLE]).await?;
    let version = Value::String(SCHEMA_VERSION.to_string());
    if CrudService::read::<SchemaMigration>(store, &version).await?.is_some() {
        tracing::info!(version = SCHEMA_VERSION, "schema up to date");
        return Ok(MigrationOutcome::UpToDate);
    }

    store.sync_schema(tables).await?;

    let mut row = Record::new();
    row.insert("version".into(), version);
    CrudService::create::<SchemaMigration>(store, row).await?;
    record_environment(store, environment).await?;

    tracing::info!(version = SCHEMA_VERSION, tables = tables.len(), "schema migrated");
    Ok(MigrationOutcome::Applied)
}

async fn record_environment(store: &dyn Store, environment: &str) -> Result<(), AppError> {
    store.sync_schema(&[ArInternalMetadata::TABLE]).await?;
    let key = Value::String("environment".into());
    let mut row = Record::new();
    row.insert("value".into(), Value::String(environment.to_string()));
    if CrudService::read::<ArInternalMetadata>(store, &key).await?.is_some() {
        CrudService::update::<ArInternalMetadata>(store, &key, row).await?;
    } else {
        row.insert("key".into(), key);
        CrudService::create::<ArInternalMetadata>(store, row).await?;
    }
    Ok(())
}
