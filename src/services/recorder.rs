//! Clock event recording service.
//!
//! Takes the latest location fix, classifies it against the authorized zone,
//! and persists exactly one immutable [`ClockEventRecord`]. Being outside the
//! zone never blocks the write; the classification travels back to the caller
//! so the outcome can be shown as a warning instead.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{
    ClockEventRecord, ClockEventType, Coordinate, EmployeeId, EventId, GeofenceZone,
    LocationSample, ZoneClassification,
};
use crate::geofence;
use crate::models::event::compute_event_checksum;
use crate::store::{EventStore, StoreError};

/// Errors from a single recording attempt.
///
/// None of these carry a partial write: either the store acknowledged the
/// event or nothing was persisted.
#[derive(Debug, Error)]
pub enum ClockError {
    /// No location fix has been obtained yet. The user retries once the
    /// watcher delivers one.
    #[error("No location fix available yet")]
    NoLocationFix,
    /// The latest sample carries an out-of-range coordinate, which means the
    /// provider broke its contract.
    #[error("Invalid location sample: {reason}")]
    InvalidSample { reason: String },
    /// The single persistence attempt failed and the record was discarded.
    /// Retrying means invoking the recording again.
    #[error("Could not persist clock event: {source}")]
    PersistenceUnavailable {
        #[source]
        source: StoreError,
    },
}

/// Outcome of a successful recording.
#[derive(Debug, Clone)]
pub struct ClockReceipt {
    /// Store-assigned identifier
    pub event_id: EventId,
    /// The record as persisted, id filled in
    pub record: ClockEventRecord,
    /// Zone classification at recording time
    pub geofence: ZoneClassification,
}

/// Records clock events against a configured geofence zone.
///
/// The recorder itself does not serialize concurrent invocations; the
/// session layer does. Each call makes exactly one store write attempt.
pub struct ClockEventRecorder {
    store: Arc<dyn EventStore>,
    zone: GeofenceZone,
    collection: String,
}

impl ClockEventRecorder {
    /// Create a recorder writing to `collection` on the given store.
    pub fn new(
        store: Arc<dyn EventStore>,
        zone: GeofenceZone,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            zone,
            collection: collection.into(),
        }
    }

    /// The zone events are classified against.
    pub fn zone(&self) -> &GeofenceZone {
        &self.zone
    }

    /// The store collection events are appended to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Record one clock event from the latest location fix.
    ///
    /// Without a fix nothing is written and [`ClockError::NoLocationFix`] is
    /// returned. The `outside_zone` flag is computed here, once, and never
    /// recomputed afterwards; readers of the stored event see the position
    /// truth at recording time.
    pub async fn record_event(
        &self,
        employee_id: &EmployeeId,
        event_type: ClockEventType,
        activity_label: &str,
        latest_sample: Option<LocationSample>,
    ) -> Result<ClockReceipt, ClockError> {
        let sample = latest_sample.ok_or(ClockError::NoLocationFix)?;

        // Samples normally arrive validated from the watcher, but a record
        // built from raw provider output is re-checked here.
        let coordinate = Coordinate::new(sample.coordinate.latitude, sample.coordinate.longitude)
            .map_err(|reason| ClockError::InvalidSample { reason })?;

        let classification = geofence::classify(&coordinate, &self.zone);
        if !classification.inside_zone {
            warn!(
                "Recording {} for {} outside authorized zone ({:.0} m from center)",
                event_type, employee_id, classification.distance_m
            );
        }

        let mut record = ClockEventRecord::new(
            employee_id.clone(),
            event_type,
            activity_label.to_string(),
            coordinate,
            Utc::now(),
            !classification.inside_zone,
        );
        record.checksum = compute_event_checksum(&record);

        let stored = self
            .store
            .append_event(&self.collection, &record)
            .await
            .map_err(|source| ClockError::PersistenceUnavailable { source })?;

        record.event_id = Some(stored.event_id);

        info!(
            "Recorded {} event {} for {} ({:.0} m from zone center)",
            event_type,
            stored.event_id,
            employee_id,
            classification.distance_m
        );

        Ok(ClockReceipt {
            event_id: stored.event_id,
            record,
            geofence: classification,
        })
    }
}
