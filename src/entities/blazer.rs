//! Saved queries, dashboards, checks and the query audit trail.

use super::Hooks;
use chrono::NaiveDateTime;

entity! {
    BlazerQuery => "blazer_queries", key = id, generated {
        id: i64,
        creator_id: Option<i64>,
        name: Option<String>,
        description: Option<String>,
        statement: Option<String>,
        data_source: Option<String>,
        status: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for BlazerQuery {}

entity! {
    BlazerDashboard => "blazer_dashboards", key = id, generated {
        id: i64,
        creator_id: Option<i64>,
        name: Option<String>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for BlazerDashboard {}

entity! {
    /// Placement of a query on a dashboard.
    BlazerDashboardQuery => "blazer_dashboard_queries", key = id, generated {
        id: i64,
        dashboard_id: Option<i64>,
        query_id: Option<i64>,
        position: Option<i32>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for BlazerDashboardQuery {}

entity! {
    BlazerCheck => "blazer_checks", key = id, generated {
        id: i64,
        creator_id: Option<i64>,
        query_id: Option<i64>,
        state: Option<String>,
        schedule: Option<String>,
        emails: Option<String>,
        slack_channels: Option<String>,
        check_type: Option<String>,
        message: Option<String>,
        last_run_at: Option<NaiveDateTime>,
        created_at: NaiveDateTime,
        updated_at: NaiveDateTime,
    }
}

impl Hooks for BlazerCheck {}

entity! {
    BlazerAudit => "blazer_audits", key = id, generated {
        id: i64,
        user_id: Option<i64>,
        query_id: Option<i64>,
        statement: Option<String>,
        data_source: Option<String>,
        created_at: Option<NaiveDateTime>,
    }
}

impl Hooks for BlazerAudit {}
