//! Payload handling between JSON records and typed entities: decode, hooks, timestamps.

use crate::entities::{Action, Entity};
use crate::error::AppError;
use crate::model::TableInfo;
use crate::store::Record;
use chrono::{NaiveDateTime, SubsecRound, Utc};
use serde_json::Value;

/// Request bodies must be JSON objects.
pub fn body_to_record(value: Value) -> Result<Record, AppError> {
    match value {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Current UTC time at the precision PostgreSQL stores (microseconds).
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(6)
}

pub fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// Set `created_at` (create only) and `updated_at` when the table has them.
pub fn stamp(table: &TableInfo, record: &mut Record, action: Action, at: NaiveDateTime) {
    let ts = Value::String(format_timestamp(&at));
    if action == Action::Create && table.has_column("created_at") {
        record.insert("created_at".into(), ts.clone());
    }
    if table.has_column("updated_at") {
        record.insert("updated_at".into(), ts);
    }
}

/// Decode a record into `T`. Missing required fields and mistyped values are validation errors.
pub fn decode<T: Entity>(record: Record) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(record))
        .map_err(|e| AppError::Validation(format!("{}: {}", T::name(), e)))
}

pub fn encode<T: Entity>(entity: &T) -> Result<Record, AppError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::Storage(format!("{} did not encode to an object", T::name()))),
        Err(e) => Err(AppError::Storage(e.to_string())),
    }
}

/// prepare, then validate, then before_save.
pub fn run_hooks<T: Entity>(entity: &mut T, action: Action) -> Result<(), AppError> {
    entity.prepare();
    entity.validate(action)?;
    entity.before_save()
}
