use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::clock_events;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clock_events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // Some fields used only for database operations
pub struct ClockEventRow {
    pub event_id: i64,
    pub collection: String,
    pub employee_id: String,
    pub event_type: String,
    pub activity_label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub outside_zone: bool,
    pub checksum: String,
    pub client_timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clock_events)]
pub struct NewClockEventRow {
    pub collection: String,
    pub employee_id: String,
    pub event_type: String,
    pub activity_label: String,
    pub latitude: f64,
    pub longitude: f64,
    pub outside_zone: bool,
    pub checksum: String,
    pub client_timestamp: DateTime<Utc>,
}
