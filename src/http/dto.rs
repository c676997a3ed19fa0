//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! The event record itself is re-exported from the api module since it
//! already derives Serialize/Deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Re-export existing types that are already serializable
pub use crate::api::{ClockEventRecord, ClockEventType, Coordinate, EventId, GeofenceZone};

/// Query parameters for the employee events listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventsQuery {
    /// Maximum number of events to return (capped at the store limit)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Response for a recorded clock event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEventResponse {
    /// Store-assigned event identifier
    pub event_id: EventId,
    /// Message about the operation
    pub message: String,
    /// Server-side persistence timestamp
    pub recorded_at: DateTime<Utc>,
}

/// Employee event list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsListResponse {
    /// Events, newest first
    pub events: Vec<ClockEventRecord>,
    /// Number of events returned
    pub total: usize,
}

/// Authorized zone response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneResponse {
    /// Zone center latitude in degrees
    pub latitude: f64,
    /// Zone center longitude in degrees
    pub longitude: f64,
    /// Zone radius in meters
    pub radius_m: f64,
}

impl From<GeofenceZone> for ZoneResponse {
    fn from(zone: GeofenceZone) -> Self {
        Self {
            latitude: zone.center.latitude,
            longitude: zone.center.longitude,
            radius_m: zone.radius_m,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Event store connection status
    pub store: String,
}
