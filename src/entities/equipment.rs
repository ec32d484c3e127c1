//! Installed equipment: battery → column → elevator.

use super::Hooks;
use chrono::NaiveDateTime;

entity! {
    Battery => "batteries", key = id, generated {
        id: i64,
        building_id: Option<i64>,
        employee_id: Option<i64>,
        battery_type: Option<String>,
        status: Option<String>,
        commissioning_date: Option<NaiveDateTime>,
        last_inspection_date: Option<NaiveDateTime>,
        operations_certificate: Option<String>,
        information: Option<String>,
        notes: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Battery {}

entity! {
    Column => "columns", key = id, generated {
        id: i64,
        battery_id: Option<i64>,
        column_type: Option<String>,
        number_of_floors_served: Option<i32>,
        status: Option<String>,
        information: Option<String>,
        notes: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Column {}

entity! {
    Elevator => "elevators", key = id, generated {
        id: i64,
        column_id: Option<i64>,
        serial_number: Option<String>,
        model: Option<String>,
        elevator_type: Option<String>,
        status: Option<String>,
        commissioning_date: Option<NaiveDateTime>,
        last_inspection_date: Option<NaiveDateTime>,
        inspection_certificate: Option<String>,
        information: Option<String>,
        notes: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Elevator {}
