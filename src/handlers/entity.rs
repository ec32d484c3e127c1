//! Entity CRUD handlers: create, read, update, delete, list, bulk. Generic over the entity type.

use crate::entities::Entity;
use crate::error::AppError;
use crate::model::{ColumnInfo, ColumnType};
use crate::response::{success_many, success_many_created, success_one, success_one_ok};
use crate::service::{body_to_record, format_timestamp, CrudService};
use crate::state::AppState;
use crate::store::{ListQuery, Record};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::HashMap;

/// Parse a path segment or query value by the column's type.
fn parse_for_column(column: &ColumnInfo, s: &str) -> Result<Value, AppError> {
    let invalid = || AppError::BadRequest(format!("invalid value for {}: {}", column.name, s));
    Ok(match column.column_type {
        ColumnType::Integer | ColumnType::BigInt => Value::from(s.parse::<i64>().map_err(|_| invalid())?),
        ColumnType::Double => s
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid)?,
        ColumnType::Timestamp => {
            let t: NaiveDateTime = s.parse().map_err(|_| invalid())?;
            Value::String(format_timestamp(&t))
        }
        ColumnType::Text | ColumnType::Binary => Value::String(s.to_string()),
    })
}

fn parse_key<T: Entity>(key: &str) -> Result<Value, AppError> {
    let table = T::table_info();
    let column = table.key_column().ok_or_else(|| AppError::NotFound(table.name.to_string()))?;
    parse_for_column(column, key)
}

fn parse_paging(name: &str, v: &str) -> Result<u32, AppError> {
    v.parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be a non-negative integer", name)))
}

/// Build a list query from `limit`, `offset` and column filters. Unknown parameters are ignored.
fn list_query<T: Entity>(params: HashMap<String, String>) -> Result<ListQuery, AppError> {
    let table = T::table_info();
    let mut query = ListQuery::default();
    for (k, v) in params {
        match k.as_str() {
            "limit" => query.limit = parse_paging("limit", &v)?,
            "offset" => query.offset = parse_paging("offset", &v)?,
            _ => {
                if let Some(column) = table.column(&k) {
                    let val = parse_for_column(column, &v)?;
                    query = query.filter(column.name, val);
                }
            }
        }
    }
    Ok(query)
}

pub async fn list<T: Entity>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let query = list_query::<T>(params)?;
    let rows = CrudService::list::<T>(state.store.as_ref(), &query).await?;
    Ok(success_many(rows))
}

pub async fn create<T: Entity>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let body = body_to_record(body)?;
    let row = CrudService::create::<T>(state.store.as_ref(), body).await?;
    Ok(success_one(row))
}

pub async fn bulk_create<T: Entity>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let items: Vec<Record> = match body {
        Value::Array(arr) => arr.into_iter().map(body_to_record).collect::<Result<_, _>>()?,
        _ => return Err(AppError::BadRequest("body must be a JSON array".into())),
    };
    let rows = CrudService::bulk_create::<T>(state.store.as_ref(), items).await?;
    Ok(success_many_created(rows))
}

pub async fn read<T: Entity>(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_key::<T>(&key)?;
    let row = CrudService::read::<T>(state.store.as_ref(), &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {}", T::name(), key)))?;
    Ok(success_one_ok(row))
}

/// PUT and PATCH: the body is merged over the stored row.
pub async fn update<T: Entity>(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let id = parse_key::<T>(&key)?;
    let body = body_to_record(body)?;
    let row = CrudService::update::<T>(state.store.as_ref(), &id, body).await?;
    Ok(success_one_ok(row))
}

pub async fn delete<T: Entity>(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_key::<T>(&key)?;
    CrudService::delete::<T>(state.store.as_ref(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
