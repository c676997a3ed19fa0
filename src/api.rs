//! Public API surface for the time-clock backend.
//!
//! This file consolidates the core domain types shared by the services,
//! the event store, and the HTTP API. All wire-facing types derive
//! Serialize/Deserialize for JSON serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clock event identifier (database primary key, store-assigned).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EventId(pub i64);

impl EventId {
    pub fn new(value: i64) -> Self {
        EventId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EventId> for i64 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// Employee identifier (stable id issued by the identity provider).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(value: impl Into<String>) -> Self {
        EmployeeId(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EmployeeId> for String {
    fn from(id: EmployeeId) -> Self {
        id.0
    }
}

/// Geographic coordinate (latitude, longitude).
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err("Latitude must be between -90 and 90 degrees".to_string());
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err("Longitude must be between -180 and 180 degrees".to_string());
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Circular geofence around an authorized job site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeofenceZone {
    /// Center of the authorized zone
    pub center: Coordinate,
    /// Zone radius in meters
    pub radius_m: f64,
}

impl GeofenceZone {
    pub fn new(center: Coordinate, radius_m: f64) -> Result<Self, String> {
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err("Zone radius must be a positive number of meters".to_string());
        }
        Ok(Self { center, radius_m })
    }
}

/// Result of classifying a point against a geofence zone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneClassification {
    /// Great-circle distance from the zone center in meters
    pub distance_m: f64,
    /// Whether the point lies within the zone (boundary inclusive)
    pub inside_zone: bool,
}

/// A single position fix delivered by a location provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationSample {
    /// Position of the fix
    pub coordinate: Coordinate,
    /// When the provider captured the fix
    pub captured_at: DateTime<Utc>,
}

impl LocationSample {
    pub fn new(coordinate: Coordinate, captured_at: DateTime<Utc>) -> Self {
        Self {
            coordinate,
            captured_at,
        }
    }
}

/// Direction of a clock event.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClockEventType {
    CheckIn,
    CheckOut,
}

impl ClockEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockEventType::CheckIn => "CHECK_IN",
            ClockEventType::CheckOut => "CHECK_OUT",
        }
    }
}

impl std::str::FromStr for ClockEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHECK_IN" => Ok(ClockEventType::CheckIn),
            "CHECK_OUT" => Ok(ClockEventType::CheckOut),
            other => Err(format!(
                "Unknown clock event type '{}', expected CHECK_IN or CHECK_OUT",
                other
            )),
        }
    }
}

impl std::fmt::Display for ClockEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of one clock-in/clock-out action.
///
/// `outside_zone` is computed once when the record is created and stored
/// verbatim afterwards; it is never recomputed from the coordinate, so the
/// stored value reflects the geofence decision made at capture time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClockEventRecord {
    /// Database ID (absent until the store assigns one)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
    /// Employee who recorded the event
    pub employee_id: EmployeeId,
    /// Whether this is a check-in or a check-out
    pub event_type: ClockEventType,
    /// Free-form activity label chosen by the employee
    pub activity_label: String,
    /// Position at capture time
    pub coordinate: Coordinate,
    /// Client-side capture timestamp
    pub client_timestamp: DateTime<Utc>,
    /// Whether the position was outside the authorized zone at capture time
    pub outside_zone: bool,
    /// SHA256 checksum of the identifying fields
    #[serde(default)]
    pub checksum: String,
}

impl ClockEventRecord {
    pub fn new(
        employee_id: EmployeeId,
        event_type: ClockEventType,
        activity_label: String,
        coordinate: Coordinate,
        client_timestamp: DateTime<Utc>,
        outside_zone: bool,
    ) -> Self {
        Self {
            event_id: None,
            employee_id,
            event_type,
            activity_label,
            coordinate,
            client_timestamp,
            outside_zone,
            checksum: String::new(),
        }
    }
}

/// Receipt returned by the event store after a successful append.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredEvent {
    /// Store-assigned event ID
    pub event_id: EventId,
    /// Server-side timestamp of the write
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::{ClockEventType, Coordinate, EmployeeId, EventId, GeofenceZone};
    use std::str::FromStr;

    #[test]
    fn test_event_id_new() {
        let id = EventId::new(42);
        assert_eq!(id.value(), 42);
    }

    #[test]
    fn test_event_id_equality() {
        let id1 = EventId::new(100);
        let id2 = EventId::new(100);
        let id3 = EventId::new(101);

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_event_id_ordering() {
        let id1 = EventId::new(1);
        let id2 = EventId::new(2);

        assert!(id1 < id2);
        assert!(id2 > id1);
    }

    #[test]
    fn test_event_id_display() {
        assert_eq!(EventId::new(7).to_string(), "7");
    }

    #[test]
    fn test_employee_id_new() {
        let id = EmployeeId::new("emp-001");
        assert_eq!(id.value(), "emp-001");
    }

    #[test]
    fn test_employee_id_equality() {
        let id1 = EmployeeId::new("abc");
        let id2 = EmployeeId::new("abc");
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_employee_ids_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(EmployeeId::new("a"));
        set.insert(EmployeeId::new("b"));
        set.insert(EmployeeId::new("a")); // Duplicate

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_coordinate_valid() {
        let coord = Coordinate::new(4.533, -75.675).unwrap();
        assert_eq!(coord.latitude, 4.533);
        assert_eq!(coord.longitude, -75.675);
    }

    #[test]
    fn test_coordinate_boundary_values() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_coordinate_latitude_out_of_range() {
        assert!(Coordinate::new(90.1, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
    }

    #[test]
    fn test_coordinate_longitude_out_of_range() {
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(0.0, -200.0).is_err());
    }

    #[test]
    fn test_coordinate_rejects_non_finite() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
        assert!(Coordinate::new(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_zone_requires_positive_radius() {
        let center = Coordinate::new(4.533, -75.675).unwrap();
        assert!(GeofenceZone::new(center, 200.0).is_ok());
        assert!(GeofenceZone::new(center, 0.0).is_err());
        assert!(GeofenceZone::new(center, -5.0).is_err());
        assert!(GeofenceZone::new(center, f64::NAN).is_err());
    }

    #[test]
    fn test_event_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ClockEventType::CheckIn).unwrap(),
            "\"CHECK_IN\""
        );
        assert_eq!(
            serde_json::to_string(&ClockEventType::CheckOut).unwrap(),
            "\"CHECK_OUT\""
        );
    }

    #[test]
    fn test_event_type_from_str() {
        assert_eq!(
            ClockEventType::from_str("CHECK_IN").unwrap(),
            ClockEventType::CheckIn
        );
        assert_eq!(
            ClockEventType::from_str("CHECK_OUT").unwrap(),
            ClockEventType::CheckOut
        );
        assert!(ClockEventType::from_str("LUNCH").is_err());
    }
}
