//! Record access layer: CrudService over any entity type.

mod crud;
mod validation;
pub use crud::{CrudService, BULK_LIMIT};
pub use validation::{body_to_record, format_timestamp, now};
