// ============================================================================
// JSON Parsing Functions
// ============================================================================
//
// These functions provide string-based parsing and validation for clock event
// payloads arriving from clients, plus the canonical checksum used to
// fingerprint a record for the audit trail.

use crate::api;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

#[derive(serde::Deserialize)]
struct EventInput {
    pub employee_id: String,
    pub event_type: String,
    #[serde(default)]
    pub activity_label: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub client_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outside_zone: bool,
    #[serde(default)]
    pub checksum: String,
}

fn validate_input_event(event_json: &str) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(event_json).context("Invalid event JSON")?;
    let obj = value
        .as_object()
        .context("Event payload must be a JSON object")?;

    let non_empty_string = |key: &str| {
        obj.get(key)
            .and_then(|v| v.as_str())
            .map(|s| !s.is_empty())
            .unwrap_or(false)
    };

    if !non_empty_string("employee_id") || !non_empty_string("event_type") {
        anyhow::bail!("employee_id and event_type are required");
    }
    Ok(())
}

/// Parse a clock event from a JSON string.
///
/// This function validates the payload (required fields, event type enum,
/// coordinate ranges), deserializes it using Serde, and computes the record
/// checksum when the payload does not carry one.
///
/// The `outside_zone` flag is taken verbatim from the payload: the geofence
/// decision belongs to the capture side, and re-deriving it here would
/// rewrite the audit trail.
///
/// # Arguments
///
/// * `event_json` - Event JSON (snake_case field names)
///
/// # Returns
///
/// A fully populated `ClockEventRecord` with a computed checksum.
pub fn parse_event_json_str(event_json: &str) -> Result<api::ClockEventRecord> {
    validate_input_event(event_json)?;

    let input: EventInput = serde_json::from_str(event_json)
        .context("Failed to deserialize event JSON using Serde")?;

    let event_type: api::ClockEventType = input
        .event_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("event_type must be CHECK_IN or CHECK_OUT")?;

    let coordinate = api::Coordinate::new(input.latitude, input.longitude)
        .map_err(|e| anyhow::anyhow!(e))?;

    let mut record = api::ClockEventRecord {
        event_id: None,
        employee_id: api::EmployeeId::new(input.employee_id),
        event_type,
        activity_label: input.activity_label,
        coordinate,
        client_timestamp: input.client_timestamp.unwrap_or_else(Utc::now),
        outside_zone: input.outside_zone,
        checksum: input.checksum,
    };

    // Compute checksum if not provided
    if record.checksum.is_empty() {
        record.checksum = compute_event_checksum(&record);
    }

    Ok(record)
}

/// Compute the canonical checksum of a clock event record.
///
/// The canonical form covers the identifying fields only; the store-assigned
/// id and the checksum itself are excluded, so the fingerprint is stable
/// across parse, persist, and read-back.
pub fn compute_event_checksum(record: &api::ClockEventRecord) -> String {
    let canonical = format!(
        "{}|{}|{}|{}|{}|{}|{}",
        record.employee_id,
        record.event_type,
        record.activity_label,
        record.coordinate.latitude,
        record.coordinate.longitude,
        record.client_timestamp.to_rfc3339(),
        record.outside_zone,
    );
    crate::store::checksum::calculate_checksum(&canonical)
}

// ============================================================================
// Tests
// ============================================================================
