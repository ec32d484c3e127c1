//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from table metadata.

use super::PgBindValue;
use crate::error::{AppError, ConfigError};
use crate::model::{ColumnInfo, TableInfo};
use crate::store::Record;
use serde_json::Value;

/// Quote identifier for PostgreSQL (safe: only from table metadata).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Bind `v` for `column`; returns the placeholder (`$n`).
    fn push_param(&mut self, column: &ColumnInfo, v: &Value) -> Result<String, AppError> {
        self.params.push(PgBindValue::for_column(column, v)?);
        Ok(format!("${}", self.params.len()))
    }
}

fn key_column(table: &TableInfo) -> Result<&'static ColumnInfo, AppError> {
    table.key_column().ok_or_else(|| {
        AppError::Config(ConfigError::InvalidPrimaryKey {
            table: table.name.to_string(),
            column: table.primary_key.to_string(),
        })
    })
}

fn column_list(table: &TableInfo) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key.
pub fn select_by_key(table: &TableInfo, key: &Value) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let pk = key_column(table)?;
    let ph = q.push_param(pk, key)?;
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        column_list(table),
        quoted(table.name),
        quoted(pk.name),
        ph
    );
    Ok(q)
}

/// SELECT list with optional filters (exact match per column), ORDER BY pk, LIMIT/OFFSET.
/// Filters on unknown columns are skipped; params are bound in filter order.
pub fn select_list(
    table: &TableInfo,
    filters: &[(String, Value)],
    limit: u32,
    offset: u32,
) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let pk = key_column(table)?;

    let mut where_parts = Vec::new();
    for (col, val) in filters {
        let Some(column) = table.column(col) else { continue };
        if val.is_null() {
            where_parts.push(format!("{} IS NULL", quoted(column.name)));
            continue;
        }
        let ph = q.push_param(column, val)?;
        where_parts.push(format!("{} = {}", quoted(column.name), ph));
    }

    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        column_list(table),
        quoted(table.name),
        where_clause,
        quoted(pk.name),
        limit,
        offset
    );
    Ok(q)
}

/// INSERT one row. A generated key is left to the identity column; other columns missing from `row` bind NULL.
pub fn insert(table: &TableInfo, row: &Record) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in table.columns {
        if c.primary_key && table.key_generated {
            continue;
        }
        let val = row.get(c.name).unwrap_or(&Value::Null);
        placeholders.push(q.push_param(c, val)?);
        cols.push(quoted(c.name));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(table.name),
        cols.join(", "),
        placeholders.join(", "),
        column_list(table)
    );
    Ok(q)
}

/// UPDATE by key: SET only columns present in `changes` (and in the table), never the key.
/// With nothing to set this degrades to a SELECT by key so callers still get the row back.
pub fn update(table: &TableInfo, key: &Value, changes: &Record) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let pk = key_column(table)?;
    let mut sets = Vec::new();
    for (k, v) in changes {
        let Some(c) = table.column(k) else { continue };
        if c.primary_key {
            continue;
        }
        let ph = q.push_param(c, v)?;
        sets.push(format!("{} = {}", quoted(c.name), ph));
    }
    if sets.is_empty() {
        return select_by_key(table, key);
    }
    let id_ph = q.push_param(pk, key)?;
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        sets.join(", "),
        quoted(pk.name),
        id_ph,
        column_list(table)
    );
    Ok(q)
}

/// DELETE by key, returning the key of the removed row.
pub fn delete(table: &TableInfo, key: &Value) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let pk = key_column(table)?;
    let ph = q.push_param(pk, key)?;
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        quoted(pk.name),
        ph,
        quoted(pk.name)
    );
    Ok(q)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BlazerDashboardQuery, Entity, SchemaMigration};
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn insert_skips_generated_key() {
        let q = insert(
            BlazerDashboardQuery::TABLE,
            &record(json!({ "id": 99, "dashboard_id": 5, "query_id": 7, "position": 1 })),
        )
        .unwrap();
        assert_eq!(
            q.sql,
            "INSERT INTO \"blazer_dashboard_queries\" (\"dashboard_id\", \"query_id\", \"position\", \"created_at\", \"updated_at\") \
             VALUES ($1, $2, $3, $4, $5) RETURNING \"id\", \"dashboard_id\", \"query_id\", \"position\", \"created_at\", \"updated_at\""
        );
        assert_eq!(q.params[0], PgBindValue::I64(5));
        assert_eq!(q.params[2], PgBindValue::I32(1));
        assert!(matches!(q.params[3], PgBindValue::Null(_)));
    }

    #[test]
    fn insert_keeps_natural_key() {
        let q = insert(SchemaMigration::TABLE, &record(json!({ "version": "20240101000000" }))).unwrap();
        assert_eq!(
            q.sql,
            "INSERT INTO \"schema_migrations\" (\"version\") VALUES ($1) RETURNING \"version\""
        );
        assert_eq!(q.params, vec![PgBindValue::String("20240101000000".into())]);
    }

    #[test]
    fn select_list_filters_known_columns_only() {
        let filters = vec![
            ("dashboard_id".to_string(), json!(5)),
            ("nope".to_string(), json!(1)),
            ("position".to_string(), Value::Null),
        ];
        let q = select_list(BlazerDashboardQuery::TABLE, &filters, 100, 20).unwrap();
        assert!(q
            .sql
            .ends_with("FROM \"blazer_dashboard_queries\" WHERE \"dashboard_id\" = $1 AND \"position\" IS NULL ORDER BY \"id\" LIMIT 100 OFFSET 20"));
        assert_eq!(q.params, vec![PgBindValue::I64(5)]);
    }

    #[test]
    fn update_never_sets_key() {
        let q = update(
            BlazerDashboardQuery::TABLE,
            &json!(3),
            &record(json!({ "id": 4, "position": 2 })),
        )
        .unwrap();
        assert_eq!(
            q.sql,
            "UPDATE \"blazer_dashboard_queries\" SET \"position\" = $1 WHERE \"id\" = $2 RETURNING \"id\", \"dashboard_id\", \"query_id\", \"position\", \"created_at\", \"updated_at\""
        );
        assert_eq!(q.params, vec![PgBindValue::I32(2), PgBindValue::I64(3)]);
    }

    #[test]
    fn empty_update_selects() {
        let q = update(BlazerDashboardQuery::TABLE, &json!(3), &Record::new()).unwrap();
        assert!(q.sql.starts_with("SELECT "));
        assert_eq!(q.params, vec![PgBindValue::I64(3)]);
    }

    #[test]
    fn delete_and_select_bind_typed_key() {
        let q = delete(SchemaMigration::TABLE, &json!("1")).unwrap();
        assert_eq!(
            q.sql,
            "DELETE FROM \"schema_migrations\" WHERE \"version\" = $1 RETURNING \"version\""
        );
        assert!(select_by_key(BlazerDashboardQuery::TABLE, &json!("abc")).is_err());
    }

    #[test]
    fn quotes_embedded_quotes() {
        assert_eq!(quoted("a\"b"), "\"a\"\"b\"");
    }
}
