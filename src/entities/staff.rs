use super::Hooks;
use chrono::NaiveDateTime;

entity! {
    Employee => "employees", key = id, generated {
        id: i64,
        user_id: Option<i64>,
        first_name: String,
        last_name: String,
        title: Option<String>,
        email: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Employee {}
