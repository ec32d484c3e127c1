//! Contact-form leads and quote requests.

use super::Hooks;
use chrono::NaiveDateTime;
use serde_with::base64::Base64;

entity! {
    #[serde_with::serde_as]
    Lead => "leads", key = id, generated {
        id: i64,
        full_name: String,
        company_name: Option<String>,
        email: String,
        phone: Option<String>,
        project_name: Option<String>,
        project_description: Option<String>,
        department: Option<String>,
        message: Option<String>,
        /// Base64 in JSON.
        #[serde_as(as = "Option<Base64>")]
        #[schema(value_type = Option<String>, format = Byte)]
        attached_file: Option<Vec<u8>>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Lead {}

entity! {
    /// Prices are stored as submitted; nothing here computes them.
    Quote => "quotes", key = id, generated {
        id: i64,
        building_type: Option<String>,
        service_quality: Option<String>,
        number_of_apartments: Option<i32>,
        number_of_floors: Option<i32>,
        number_of_basements: Option<i32>,
        number_of_companies: Option<i32>,
        number_of_parking_spots: Option<i32>,
        number_of_elevators: Option<i32>,
        number_of_corporations: Option<i32>,
        maximum_occupancy: Option<i32>,
        business_hours: Option<i32>,
        elevator_amount: Option<i32>,
        unit_price: Option<f64>,
        total_price_elevators: Option<f64>,
        installation_fees: Option<f64>,
        final_price: Option<f64>,
        company_name: Option<String>,
        email: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for Quote {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attached_file_travels_as_base64() {
        let lead: Lead = serde_json::from_value(serde_json::json!({
            "id": 3,
            "full_name": "Ada",
            "email": "ada@example.com",
            "attached_file": "aGVsbG8=",
            "created_at": "2024-05-01T10:00:00",
            "updated_at": "2024-05-01T10:00:00"
        }))
        .unwrap();
        assert_eq!(lead.attached_file.as_deref(), Some(&b"hello"[..]));
        assert_eq!(lead.phone, None);
        let out = serde_json::to_value(&lead).unwrap();
        assert_eq!(out["attached_file"], "aGVsbG8=");
    }

    #[test]
    fn missing_attachment_is_none() {
        let lead: Lead = serde_json::from_value(serde_json::json!({
            "id": 3,
            "full_name": "Ada",
            "email": "ada@example.com",
            "created_at": "2024-05-01T10:00:00",
            "updated_at": "2024-05-01T10:00:00"
        }))
        .unwrap();
        assert!(lead.attached_file.is_none());
    }
}
