//! Bookkeeping tables kept alongside the application schema.

use super::Hooks;
use chrono::NaiveDateTime;

entity! {
    /// One row per applied schema version.
    SchemaMigration => "schema_migrations", key = version {
        version: String,
    }
}

impl Hooks for SchemaMigration {}

entity! {
    /// Environment facts recorded by the migration (e.g. `environment`).
    ArInternalMetadata => "ar_internal_metadata", key = key {
        key: String,
        value: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for ArInternalMetadata {}
