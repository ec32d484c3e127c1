//! Customers and the buildings they own.

use super::Hooks;
use chrono::NaiveDateTime;

entity! {
    Customer => "customers", key = id, generated {
        id: i64,
        user_id: Option<i64>,
        address_id: Option<i64>,
        customer_creation_date: Option<NaiveDateTime>,
        company_name: String,
        company_contact_full_name: Option<String>,
        company_contact_phone: Option<String>,
        company_contact_email: Option<String>,
        company_description: Option<String>,
        service_technical_authority_full_name: Option<String>,
        service_technical_authority_phone: Option<String>,
        service_technical_manager_email: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Customer {}

entity! {
    Building => "buildings", key = id, generated {
        id: i64,
        customer_id: Option<i64>,
        address_id: Option<i64>,
        building_administrator_full_name: Option<String>,
        building_administrator_email: Option<String>,
        building_administrator_phone: Option<String>,
        building_technical_contact_full_name: Option<String>,
        building_technical_contact_email: Option<String>,
        building_technical_contact_phone: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Building {}

entity! {
    /// Free-form key/value facts about a building (e.g. number of floors).
    BuildingDetail => "building_details", key = id, generated {
        id: i64,
        building_id: Option<i64>,
        information_key: String,
        value: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for BuildingDetail {}
