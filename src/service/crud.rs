//! Generic CRUD over any entity: payload decoding, hooks and timestamps on the way in,
//! typed entities on the way out.

use super::validation::{decode, encode, now, run_hooks, stamp};
use crate::entities::{Action, Entity};
use crate::error::AppError;
use crate::store::{ListQuery, Record, Store};
use serde_json::Value;

/// Most items accepted by one bulk create.
pub const BULK_LIMIT: usize = 100;

pub struct CrudService;

impl CrudService {
    /// Insert one row from `body`. A client-supplied generated key is ignored.
    pub async fn create<T: Entity>(store: &dyn Store, body: Record) -> Result<T, AppError> {
        let row = Self::new_row::<T>(body)?;
        let saved = store.insert(T::TABLE, &row).await?;
        decode(saved)
    }

    /// Insert up to `BULK_LIMIT` rows; all or none are stored.
    pub async fn bulk_create<T: Entity>(store: &dyn Store, items: Vec<Record>) -> Result<Vec<T>, AppError> {
        if items.len() > BULK_LIMIT {
            return Err(AppError::BadRequest(format!(
                "bulk create limited to {} items",
                BULK_LIMIT
            )));
        }
        let rows = items
            .into_iter()
            .map(Self::new_row::<T>)
            .collect::<Result<Vec<_>, _>>()?;
        let saved = store.insert_many(T::TABLE, &rows).await?;
        saved.into_iter().map(decode).collect()
    }

    pub async fn read<T: Entity>(store: &dyn Store, key: &Value) -> Result<Option<T>, AppError> {
        store.fetch(T::TABLE, key).await?.map(decode).transpose()
    }

    /// Rows matching `query` in key order.
    pub async fn list<T: Entity>(store: &dyn Store, query: &ListQuery) -> Result<Vec<T>, AppError> {
        let rows = store.list(T::TABLE, query).await?;
        rows.into_iter().map(decode).collect()
    }

    /// Merge `patch` over the stored row and write it back. The key and `created_at` never change.
    pub async fn update<T: Entity>(store: &dyn Store, key: &Value, mut patch: Record) -> Result<T, AppError> {
        let table = T::TABLE;
        let mut merged = store
            .fetch(table, key)
            .await?
            .ok_or_else(|| not_found::<T>(key))?;
        if let Some(given) = patch.get(table.primary_key) {
            if given != key {
                return Err(AppError::BadRequest(format!(
                    "{} in body does not match the path",
                    table.primary_key
                )));
            }
        }
        patch.remove("created_at");
        merged.extend(patch);
        stamp(table, &mut merged, Action::Update, now());

        let mut entity: T = decode(merged)?;
        run_hooks(&mut entity, Action::Update)?;
        let row = encode(&entity)?;
        let saved = store
            .update(table, key, &row)
            .await?
            .ok_or_else(|| not_found::<T>(key))?;
        decode(saved)
    }

    pub async fn delete<T: Entity>(store: &dyn Store, key: &Value) -> Result<(), AppError> {
        if store.delete(T::TABLE, key).await? {
            Ok(())
        } else {
            Err(not_found::<T>(key))
        }
    }

    /// Stamp, decode, run create hooks and re-encode a new row.
    fn new_row<T: Entity>(mut body: Record) -> Result<Record, AppError> {
        let table = T::TABLE;
        if table.key_generated {
            // Placeholder so the key field decodes; storage assigns the real one.
            body.insert(table.primary_key.to_string(), Value::from(0));
        }
        stamp(table, &mut body, Action::Create, now());

        let mut entity: T = decode(body)?;
        run_hooks(&mut entity, Action::Create)?;
        let mut row = encode(&entity)?;
        if table.key_generated {
            row.remove(table.primary_key);
        }
        Ok(row)
    }
}

fn not_found<T: Entity>(key: &Value) -> AppError {
    AppError::NotFound(format!("{} {}", T::name(), key))
}
