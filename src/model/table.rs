//! Static table metadata: one `TableInfo` per entity, one `ColumnInfo` per column.

use chrono::NaiveDateTime;

/// Storage type of a column. Maps 1:1 to a PostgreSQL type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    BigInt,
    Double,
    Timestamp,
    Binary,
}

impl ColumnType {
    /// PostgreSQL type name used in DDL.
    pub fn pg_type(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Binary => "BYTEA",
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::BigInt)
    }
}

/// Maps a Rust field type to its column type and nullability.
/// `Option<T>` is the nullable form of `T`.
pub trait ColumnKind {
    const COLUMN_TYPE: ColumnType;
    const NULLABLE: bool = false;
}

impl ColumnKind for String {
    const COLUMN_TYPE: ColumnType = ColumnType::Text;
}

impl ColumnKind for i32 {
    const COLUMN_TYPE: ColumnType = ColumnType::Integer;
}

impl ColumnKind for i64 {
    const COLUMN_TYPE: ColumnType = ColumnType::BigInt;
}

impl ColumnKind for f64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Double;
}

impl ColumnKind for NaiveDateTime {
    const COLUMN_TYPE: ColumnType = ColumnType::Timestamp;
}

impl ColumnKind for Vec<u8> {
    const COLUMN_TYPE: ColumnType = ColumnType::Binary;
}

impl<T: ColumnKind> ColumnKind for Option<T> {
    const COLUMN_TYPE: ColumnType = T::COLUMN_TYPE;
    const NULLABLE: bool = true;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl ColumnInfo {
    /// Column metadata for a field of type `T`. `key` is the table's primary key column name.
    pub const fn of<T: ColumnKind>(name: &'static str, key: &'static str) -> Self {
        ColumnInfo {
            name,
            column_type: T::COLUMN_TYPE,
            nullable: T::NULLABLE,
            primary_key: same_name(name, key),
        }
    }
}

const fn same_name(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[derive(Debug, PartialEq, Eq)]
pub struct TableInfo {
    /// Table name; also the route path segment.
    pub name: &'static str,
    /// Name of the entity type (OpenAPI schema name).
    pub schema: &'static str,
    pub primary_key: &'static str,
    /// Key assigned by storage (identity column) rather than supplied by the client.
    pub key_generated: bool,
    pub columns: &'static [ColumnInfo],
}

impl TableInfo {
    pub fn column(&self, name: &str) -> Option<&'static ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn key_column(&self) -> Option<&'static ColumnInfo> {
        self.column(self.primary_key)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}
