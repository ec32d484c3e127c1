use super::Hooks;
use chrono::NaiveDateTime;

entity! {
    /// Postal address shared by customers and buildings.
    Address => "addresses", key = id, generated {
        id: i64,
        type_of_address: Option<String>,
        status: Option<String>,
        entity: Option<String>,
        number_and_street: String,
        suite_or_apartment: Option<String>,
        city: String,
        postal_code: String,
        country: String,
        notes: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Address {}
