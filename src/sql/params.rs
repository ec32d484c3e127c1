//! Convert serde_json::Value to types that sqlx can bind, guided by the column type.

use crate::error::AppError;
use crate::model::{ColumnInfo, ColumnType};
use chrono::NaiveDateTime;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A value that can be bound to a PostgreSQL query. Built from JSON for a specific column.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null(ColumnType),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Timestamp(NaiveDateTime),
    Bytes(Vec<u8>),
}

impl PgBindValue {
    pub fn for_column(column: &ColumnInfo, v: &Value) -> Result<Self, AppError> {
        let invalid = || AppError::Validation(format!("{} has the wrong type", column.name));
        Ok(match (column.column_type, v) {
            (ty, Value::Null) => PgBindValue::Null(ty),
            (ColumnType::Integer, Value::Number(n)) => {
                let n = n.as_i64().ok_or_else(invalid)?;
                PgBindValue::I32(i32::try_from(n).map_err(|_| invalid())?)
            }
            (ColumnType::BigInt, Value::Number(n)) => PgBindValue::I64(n.as_i64().ok_or_else(invalid)?),
            (ColumnType::Double, Value::Number(n)) => PgBindValue::F64(n.as_f64().ok_or_else(invalid)?),
            (ColumnType::Text, Value::String(s)) => PgBindValue::String(s.clone()),
            (ColumnType::Timestamp, Value::String(s)) => {
                PgBindValue::Timestamp(s.parse::<NaiveDateTime>().map_err(|_| invalid())?)
            }
            (ColumnType::Binary, Value::String(s)) => PgBindValue::Bytes(STANDARD.decode(s).map_err(|_| invalid())?),
            _ => return Err(invalid()),
        })
    }

    fn pg_type(&self) -> PgTypeInfo {
        match self {
            PgBindValue::Null(ty) => type_info(*ty),
            PgBindValue::I32(_) => type_info(ColumnType::Integer),
            PgBindValue::I64(_) => type_info(ColumnType::BigInt),
            PgBindValue::F64(_) => type_info(ColumnType::Double),
            PgBindValue::String(_) => type_info(ColumnType::Text),
            PgBindValue::Timestamp(_) => type_info(ColumnType::Timestamp),
            PgBindValue::Bytes(_) => type_info(ColumnType::Binary),
        }
    }
}

fn type_info(ty: ColumnType) -> PgTypeInfo {
    match ty {
        ColumnType::Text => <String as Type<Postgres>>::type_info(),
        ColumnType::Integer => <i32 as Type<Postgres>>::type_info(),
        ColumnType::BigInt => <i64 as Type<Postgres>>::type_info(),
        ColumnType::Double => <f64 as Type<Postgres>>::type_info(),
        ColumnType::Timestamp => <NaiveDateTime as Type<Postgres>>::type_info(),
        ColumnType::Binary => <Vec<u8> as Type<Postgres>>::type_info(),
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null(_) => IsNull::Yes,
            PgBindValue::I32(n) => <i32 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf)?,
            PgBindValue::Timestamp(t) => <NaiveDateTime as Encode<Postgres>>::encode_by_ref(t, buf)?,
            PgBindValue::Bytes(b) => <Vec<u8> as Encode<Postgres>>::encode_by_ref(b, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(self.pg_type())
    }
}

impl Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        type_info(ColumnType::Text)
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}
