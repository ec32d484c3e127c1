//! Entity types: one struct per table, with static column metadata and lifecycle hooks.
//!
//! Structs are declared with the `entity!` macro, which derives serde and OpenAPI
//! support and builds the `TableInfo` from the field list. Nullable columns are
//! `Option<_>` fields. Every entity also implements [`Hooks`]; the defaults are no-ops.

use crate::error::AppError;
use crate::model::TableInfo;
use serde::{de::DeserializeOwned, Serialize};

macro_rules! entity {
    (@generated) => { false };
    (@generated generated) => { true };
    (
        $(#[$meta:meta])*
        $name:ident => $table:literal, key = $key:ident $(, $generated:ident)? {
            $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $crate::entities::Entity for $name {
            const TABLE: &'static $crate::model::TableInfo = &$crate::model::TableInfo {
                name: $table,
                schema: stringify!($name),
                primary_key: stringify!($key),
                key_generated: entity!(@generated $($generated)?),
                columns: &[
                    $( $crate::model::ColumnInfo::of::<$ty>(stringify!($field), stringify!($key)), )*
                ],
            };
        }
    };
}

mod accounts;
mod active_storage;
mod blazer;
mod customers;
mod equipment;
mod locations;
mod rails;
mod sales;
mod service_calls;
mod staff;

pub use accounts::{AdminUser, User};
pub use active_storage::{ActiveStorageAttachment, ActiveStorageBlob};
pub use blazer::{BlazerAudit, BlazerCheck, BlazerDashboard, BlazerDashboardQuery, BlazerQuery};
pub use customers::{Building, BuildingDetail, Customer};
pub use equipment::{Battery, Column, Elevator};
pub use locations::Address;
pub use rails::{ArInternalMetadata, SchemaMigration};
pub use sales::{Lead, Quote};
pub use service_calls::Intervention;
pub use staff::Employee;

/// The operation a save is part of; passed to [`Hooks::validate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
}

/// Per-entity extension points run on every save: `prepare`, then `validate`, then `before_save`.
pub trait Hooks {
    fn before_save(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    /// Normalize field values before validation.
    fn prepare(&mut self) {}

    fn validate(&self, _action: Action) -> Result<(), AppError> {
        Ok(())
    }
}

/// A typed row of one table.
pub trait Entity: Hooks + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: &'static TableInfo;

    fn name() -> &'static str {
        Self::TABLE.name
    }

    fn table_info() -> &'static TableInfo {
        Self::TABLE
    }
}

/// Every table served and migrated, in migration order.
pub const TABLES: &[&TableInfo] = &[
    SchemaMigration::TABLE,
    ArInternalMetadata::TABLE,
    AdminUser::TABLE,
    User::TABLE,
    Address::TABLE,
    Customer::TABLE,
    Building::TABLE,
    BuildingDetail::TABLE,
    Battery::TABLE,
    Column::TABLE,
    Elevator::TABLE,
    Employee::TABLE,
    Intervention::TABLE,
    Lead::TABLE,
    Quote::TABLE,
    BlazerQuery::TABLE,
    BlazerDashboard::TABLE,
    BlazerDashboardQuery::TABLE,
    BlazerCheck::TABLE,
    BlazerAudit::TABLE,
    ActiveStorageBlob::TABLE,
    ActiveStorageAttachment::TABLE,
];

/// Look up a table by name.
pub fn table(name: &str) -> Option<&'static TableInfo> {
    TABLES.iter().copied().find(|t| t.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnType;

    #[test]
    fn natural_key_tables() {
        let migrations = SchemaMigration::table_info();
        assert_eq!(migrations.primary_key, "version");
        assert!(!migrations.key_generated);
        assert_eq!(migrations.columns.len(), 1);

        let meta = table("ar_internal_metadata").unwrap();
        assert_eq!(meta.primary_key, "key");
        assert!(!meta.key_generated);
        assert!(meta.column("value").unwrap().nullable);
    }

    #[test]
    fn surrogate_keys_are_generated_bigints() {
        for t in TABLES.iter().filter(|t| t.primary_key == "id") {
            assert!(t.key_generated, "{}", t.name);
            assert_eq!(t.key_column().unwrap().column_type, ColumnType::BigInt, "{}", t.name);
        }
    }

    #[test]
    fn foreign_keys_are_plain_nullable_integers() {
        let buildings = Building::table_info();
        assert_eq!(Building::name(), "buildings");
        let customer_id = buildings.column("customer_id").unwrap();
        assert!(customer_id.nullable);
        assert_eq!(customer_id.column_type, ColumnType::BigInt);
    }

    #[test]
    fn column_types_follow_field_types() {
        let quotes = Quote::table_info();
        assert_eq!(quotes.column("final_price").unwrap().column_type, ColumnType::Double);
        assert_eq!(quotes.column("number_of_floors").unwrap().column_type, ColumnType::Integer);
        let leads = Lead::table_info();
        assert_eq!(leads.column("attached_file").unwrap().column_type, ColumnType::Binary);
        assert!(!leads.column("email").unwrap().nullable);
        let audits = BlazerAudit::table_info();
        assert!(audits.column("created_at").unwrap().nullable);
        assert!(!audits.has_column("updated_at"));
    }

    #[test]
    fn default_hooks_are_no_ops() {
        let mut query = BlazerDashboardQuery {
            id: 1,
            dashboard_id: Some(5),
            query_id: Some(7),
            position: Some(1),
            created_at: chrono::NaiveDateTime::default(),
            updated_at: chrono::NaiveDateTime::default(),
        };
        let before = query.clone();
        query.prepare();
        query.validate(Action::Create).unwrap();
        query.before_save().unwrap();
        assert_eq!(query, before);
    }
}
