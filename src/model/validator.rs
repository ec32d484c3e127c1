//! Catalog validation: unique names and usable primary keys.

use crate::error::ConfigError;
use crate::model::TableInfo;
use std::collections::HashSet;

pub fn validate(tables: &[&TableInfo]) -> Result<(), ConfigError> {
    let mut table_names = HashSet::new();
    let mut schema_names = HashSet::new();

    for t in tables {
        if !table_names.insert(t.name) {
            return Err(ConfigError::DuplicateName {
                kind: "table",
                name: t.name.to_string(),
            });
        }
        if !schema_names.insert(t.schema) {
            return Err(ConfigError::DuplicateName {
                kind: "schema",
                name: t.schema.to_string(),
            });
        }

        let mut column_names = HashSet::new();
        for c in t.columns {
            if !column_names.insert(c.name) {
                return Err(ConfigError::DuplicateName {
                    kind: "column",
                    name: format!("{}.{}", t.name, c.name),
                });
            }
        }

        let key = t.key_column().ok_or_else(|| ConfigError::InvalidPrimaryKey {
            table: t.name.to_string(),
            column: t.primary_key.to_string(),
        })?;
        if key.nullable || (t.key_generated && !key.column_type.is_integral()) {
            return Err(ConfigError::InvalidPrimaryKey {
                table: t.name.to_string(),
                column: key.name.to_string(),
            });
        }
    }
    Ok(())
}
