//! In-process backend. Same contract as `PgStore`: typed columns, NOT NULL, unique keys,
//! identity keys starting at 1, all-or-nothing bulk inserts.

use super::{ListQuery, Record, Store};
use crate::error::AppError;
use crate::model::TableInfo;
use crate::sql::PgBindValue;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum RowKey {
    Int(i64),
    Text(String),
}

impl RowKey {
    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => n.as_i64().map(RowKey::Int),
            Value::String(s) => Some(RowKey::Text(s.clone())),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Table {
    rows: BTreeMap<RowKey, Record>,
    next_id: i64,
}

/// Tables held in memory, keyed by table name. Rows are kept in key order.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<&'static str, Table>>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Storage("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<&'static str, Table>>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Storage("memory store lock poisoned".into()))
    }
}

fn missing_relation(table: &TableInfo) -> AppError {
    AppError::Storage(format!("relation \"{}\" does not exist", table.name))
}

fn key_of(table: &TableInfo, key: &Value) -> Result<RowKey, AppError> {
    if let Some(pk) = table.key_column() {
        PgBindValue::for_column(pk, key)?;
    }
    RowKey::from_value(key).ok_or_else(|| AppError::Validation(format!("{} has the wrong type", table.primary_key)))
}

/// Full row with every column present and type-checked; missing columns become NULL.
fn normalize(table: &TableInfo, row: &Record) -> Result<Record, AppError> {
    let mut out = Record::new();
    for c in table.columns {
        let v = row.get(c.name).cloned().unwrap_or(Value::Null);
        PgBindValue::for_column(c, &v)?;
        out.insert(c.name.to_string(), v);
    }
    Ok(out)
}

fn check_not_null(table: &TableInfo, row: &Record) -> Result<(), AppError> {
    for c in table.columns.iter().filter(|c| !c.nullable) {
        if row.get(c.name).map_or(true, Value::is_null) {
            return Err(AppError::Validation(format!(
                "null value in column \"{}\" of relation \"{}\"",
                c.name, table.name
            )));
        }
    }
    Ok(())
}

/// Insert into `t`, assigning a generated key if the table has one.
fn insert_row(info: &TableInfo, t: &mut Table, row: &Record) -> Result<Record, AppError> {
    let mut row = normalize(info, row)?;
    if info.key_generated {
        t.next_id += 1;
        row.insert(info.primary_key.to_string(), Value::from(t.next_id));
    }
    check_not_null(info, &row)?;
    let key = row
        .get(info.primary_key)
        .and_then(RowKey::from_value)
        .ok_or_else(|| AppError::Validation(format!("{} is required", info.primary_key)))?;
    if t.rows.contains_key(&key) {
        return Err(AppError::Conflict(format!(
            "duplicate key value violates unique constraint \"{}_pkey\"",
            info.name
        )));
    }
    t.rows.insert(key, row.clone());
    Ok(row)
}

#[async_trait]
impl Store for MemoryStore {
    async fn sync_schema(&self, tables: &[&'static TableInfo]) -> Result<(), AppError> {
        let mut guard = self.write()?;
        for t in tables {
            guard.entry(t.name).or_default();
        }
        Ok(())
    }

    async fn insert(&self, table: &'static TableInfo, row: &Record) -> Result<Record, AppError> {
        let mut guard = self.write()?;
        let t = guard.get_mut(table.name).ok_or_else(|| missing_relation(table))?;
        insert_row(table, t, row)
    }

    async fn insert_many(&self, table: &'static TableInfo, rows: &[Record]) -> Result<Vec<Record>, AppError> {
        let mut guard = self.write()?;
        let t = guard.get_mut(table.name).ok_or_else(|| missing_relation(table))?;
        let (saved_rows, saved_id) = (t.rows.clone(), t.next_id);
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            match insert_row(table, t, row) {
                Ok(r) => out.push(r),
                Err(e) => {
                    t.rows = saved_rows;
                    t.next_id = saved_id;
                    return Err(e);
                }
            }
        }
        Ok(out)
    }

    async fn fetch(&self, table: &'static TableInfo, key: &Value) -> Result<Option<Record>, AppError> {
        let key = key_of(table, key)?;
        let guard = self.read()?;
        let t = guard.get(table.name).ok_or_else(|| missing_relation(table))?;
        Ok(t.rows.get(&key).cloned())
    }

    async fn list(&self, table: &'static TableInfo, query: &ListQuery) -> Result<Vec<Record>, AppError> {
        let filters: Vec<&(String, Value)> = query.filters.iter().filter(|(c, _)| table.has_column(c)).collect();
        let guard = self.read()?;
        let t = guard.get(table.name).ok_or_else(|| missing_relation(table))?;
        Ok(t
            .rows
            .values()
            .filter(|row| filters.iter().all(|(c, v)| row.get(c).unwrap_or(&Value::Null) == v))
            .skip(query.offset as usize)
            .take(query.effective_limit() as usize)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        table: &'static TableInfo,
        key: &Value,
        changes: &Record,
    ) -> Result<Option<Record>, AppError> {
        let key = key_of(table, key)?;
        let mut guard = self.write()?;
        let t = guard.get_mut(table.name).ok_or_else(|| missing_relation(table))?;
        let Some(existing) = t.rows.get(&key) else {
            return Ok(None);
        };
        let mut merged = existing.clone();
        for (k, v) in changes {
            let Some(c) = table.column(k) else { continue };
            if c.primary_key {
                continue;
            }
            PgBindValue::for_column(c, v)?;
            merged.insert(k.clone(), v.clone());
        }
        check_not_null(table, &merged)?;
        t.rows.insert(key, merged.clone());
        Ok(Some(merged))
    }

    async fn delete(&self, table: &'static TableInfo, key: &Value) -> Result<bool, AppError> {
        let key = key_of(table, key)?;
        let mut guard = self.write()?;
        let t = guard.get_mut(table.name).ok_or_else(|| missing_relation(table))?;
        Ok(t.rows.remove(&key).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ArInternalMetadata, BlazerDashboardQuery, Entity};
    use serde_json::json;

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn stamped(v: Value) -> Record {
        let mut r = record(v);
        r.insert("created_at".into(), json!("2026-01-01T00:00:00"));
        r.insert("updated_at".into(), json!("2026-01-01T00:00:00"));
        r
    }

    async fn synced() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .sync_schema(&[BlazerDashboardQuery::TABLE, ArInternalMetadata::TABLE])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn unsynced_table_is_an_error() {
        let store = MemoryStore::new();
        let err = store.fetch(BlazerDashboardQuery::TABLE, &json!(1)).await.unwrap_err();
        assert!(matches!(err, AppError::Storage(m) if m.contains("blazer_dashboard_queries")));
    }

    #[tokio::test]
    async fn generated_keys_count_from_one() {
        let store = synced().await;
        let t = BlazerDashboardQuery::TABLE;
        let a = store.insert(t, &stamped(json!({ "id": 50, "dashboard_id": 1 }))).await.unwrap();
        let b = store.insert(t, &stamped(json!({ "dashboard_id": 2 }))).await.unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
        assert_eq!(a["position"], Value::Null);
    }

    #[tokio::test]
    async fn natural_key_conflicts_and_not_null() {
        let store = synced().await;
        let t = ArInternalMetadata::TABLE;
        let row = stamped(json!({ "key": "environment", "value": "test" }));
        store.insert(t, &row).await.unwrap();
        assert!(matches!(store.insert(t, &row).await, Err(AppError::Conflict(_))));
        assert!(matches!(
            store.insert(t, &record(json!({ "key": "other" }))).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn bulk_insert_is_all_or_nothing() {
        let store = synced().await;
        let t = BlazerDashboardQuery::TABLE;
        let rows = vec![stamped(json!({ "dashboard_id": 1 })), record(json!({ "dashboard_id": 2 }))];
        assert!(store.insert_many(t, &rows).await.is_err());
        assert!(store.list(t, &ListQuery::default()).await.unwrap().is_empty());

        let rows = vec![stamped(json!({ "dashboard_id": 1 })), stamped(json!({ "dashboard_id": 2 }))];
        let saved = store.insert_many(t, &rows).await.unwrap();
        assert_eq!(saved[0]["id"], json!(1));
        assert_eq!(saved[1]["id"], json!(2));
    }

    #[tokio::test]
    async fn list_filters_and_pages_in_key_order() {
        let store = synced().await;
        let t = BlazerDashboardQuery::TABLE;
        for d in [5, 6, 5, 5] {
            store.insert(t, &stamped(json!({ "dashboard_id": d }))).await.unwrap();
        }
        let q = ListQuery::default().filter("dashboard_id", json!(5));
        let ids: Vec<Value> = store.list(t, &q).await.unwrap().iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(3), json!(4)]);

        let q = ListQuery { offset: 1, limit: 1, ..q };
        let page = store.list(t, &q).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["id"], json!(3));
    }

    #[tokio::test]
    async fn update_merges_and_keeps_key() {
        let store = synced().await;
        let t = BlazerDashboardQuery::TABLE;
        store.insert(t, &stamped(json!({ "dashboard_id": 5, "position": 1 }))).await.unwrap();
        let updated = store
            .update(t, &json!(1), &record(json!({ "id": 9, "position": 3 })))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["id"], json!(1));
        assert_eq!(updated["dashboard_id"], json!(5));
        assert_eq!(updated["position"], json!(3));
        assert!(store.update(t, &json!(2), &Record::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let store = synced().await;
        let t = BlazerDashboardQuery::TABLE;
        store.insert(t, &stamped(json!({}))).await.unwrap();
        assert!(store.delete(t, &json!(1)).await.unwrap());
        assert!(!store.delete(t, &json!(1)).await.unwrap());
        assert!(store.fetch(t, &json!(1)).await.unwrap().is_none());
    }
}
