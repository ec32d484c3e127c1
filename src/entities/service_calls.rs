use super::Hooks;
use chrono::NaiveDateTime;

entity! {
    /// A maintenance call. Each equipment reference is optional; the narrowest one set is the target.
    Intervention => "interventions", key = id, generated {
        id: i64,
        author_id: Option<i64>,
        customer_id: Option<i64>,
        building_id: Option<i64>,
        battery_id: Option<i64>,
        column_id: Option<i64>,
        elevator_id: Option<i64>,
        employee_id: Option<i64>,
        start_date_intervention: Option<NaiveDateTime>,
        end_date_intervention: Option<NaiveDateTime>,
        result: String,
        report: Option<String>,
        status: String,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Intervention {}
