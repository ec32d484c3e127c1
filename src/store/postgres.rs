//! PostgreSQL backend: parameterized statements from the SQL builder, rows decoded by column type.

use super::{ListQuery, Record, Store};
use crate::error::{AppError, ConfigError};
use crate::migration::schema_sql;
use crate::model::{ColumnType, TableInfo};
use crate::settings::Settings;
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{ConnectOptions, PgPool, Postgres, Row};
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

/// Open the pool described by `settings`. Every statement is logged at debug, slow ones at warn.
pub async fn connect(settings: &Settings) -> Result<PgStore, AppError> {
    let opts = parse_database_url(&settings.database_url)?
        .log_statements(log::LevelFilter::Debug)
        .log_slow_statements(
            log::LevelFilter::Warn,
            Duration::from_millis(settings.slow_statement_ms),
        );
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_with(opts)
        .await?;
    Ok(PgStore::new(pool))
}

fn parse_database_url(url: &str) -> Result<PgConnectOptions, ConfigError> {
    PgConnectOptions::from_str(url).map_err(|e| ConfigError::InvalidSetting {
        name: "DATABASE_URL",
        message: e.to_string(),
    })
}

/// Options for the `postgres` maintenance database plus the database to create,
/// or `None` when the URL names no database or names `postgres` itself.
fn maintenance_target(url: &str) -> Result<Option<(PgConnectOptions, String)>, ConfigError> {
    let opts = parse_database_url(url)?;
    let db_name = match opts.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(None),
    };
    Ok(Some((opts.database("postgres"), db_name)))
}

/// Create the database named in `database_url` if it does not exist, via the `postgres` maintenance DB.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some((admin, db_name)) = maintenance_target(database_url)? else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", sql::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn build(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

/// Unique violations become conflicts; NOT NULL and CHECK violations become validation errors.
fn map_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some("23505") => return AppError::Conflict(db.message().to_string()),
            Some("23502") | Some("23514") => return AppError::Validation(db.message().to_string()),
            _ => {}
        }
    }
    AppError::Db(e)
}

fn row_to_record(table: &TableInfo, row: &PgRow) -> Result<Record, AppError> {
    let mut map = Record::new();
    for c in table.columns {
        let name = c.name;
        let v = match c.column_type {
            ColumnType::Text => row.try_get::<Option<String>, _>(name)?.map(Value::String),
            ColumnType::Integer => row.try_get::<Option<i32>, _>(name)?.map(Value::from),
            ColumnType::BigInt => row.try_get::<Option<i64>, _>(name)?.map(Value::from),
            ColumnType::Double => row
                .try_get::<Option<f64>, _>(name)?
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            ColumnType::Timestamp => row
                .try_get::<Option<NaiveDateTime>, _>(name)?
                .map(|d| Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string())),
            ColumnType::Binary => row
                .try_get::<Option<Vec<u8>>, _>(name)?
                .map(|b| Value::String(STANDARD.encode(b))),
        };
        map.insert(name.to_string(), v.unwrap_or(Value::Null));
    }
    Ok(map)
}

#[async_trait]
impl Store for PgStore {
    async fn sync_schema(&self, tables: &[&'static TableInfo]) -> Result<(), AppError> {
        for statement in schema_sql(tables) {
            tracing::debug!(sql = %statement, "ddl");
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn insert(&self, table: &'static TableInfo, row: &Record) -> Result<Record, AppError> {
        let q = sql::insert(table, row)?;
        let out = build(&q).fetch_one(&self.pool).await.map_err(map_db_error)?;
        row_to_record(table, &out)
    }

    async fn insert_many(&self, table: &'static TableInfo, rows: &[Record]) -> Result<Vec<Record>, AppError> {
        let mut out = Vec::with_capacity(rows.len());
        let mut tx = self.pool.begin().await?;
        for row in rows {
            let q = sql::insert(table, row)?;
            let inserted = build(&q).fetch_one(&mut *tx).await.map_err(map_db_error)?;
            out.push(row_to_record(table, &inserted)?);
        }
        tx.commit().await?;
        Ok(out)
    }

    async fn fetch(&self, table: &'static TableInfo, key: &Value) -> Result<Option<Record>, AppError> {
        let q = sql::select_by_key(table, key)?;
        let row = build(&q).fetch_optional(&self.pool).await?;
        row.map(|r| row_to_record(table, &r)).transpose()
    }

    async fn list(&self, table: &'static TableInfo, query: &ListQuery) -> Result<Vec<Record>, AppError> {
        let q = sql::select_list(table, &query.filters, query.effective_limit(), query.offset)?;
        let rows = build(&q).fetch_all(&self.pool).await?;
        rows.iter().map(|r| row_to_record(table, r)).collect()
    }

    async fn update(
        &self,
        table: &'static TableInfo,
        key: &Value,
        changes: &Record,
    ) -> Result<Option<Record>, AppError> {
        let q = sql::update(table, key, changes)?;
        let row = build(&q).fetch_optional(&self.pool).await.map_err(map_db_error)?;
        row.map(|r| row_to_record(table, &r)).transpose()
    }

    async fn delete(&self, table: &'static TableInfo, key: &Value) -> Result<bool, AppError> {
        let q = sql::delete(table, key)?;
        let row = build(&q).fetch_optional(&self.pool).await?;
        Ok(row.is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
