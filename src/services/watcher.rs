//! Continuous location watching.
//!
//! Bridges a [`LocationProvider`] sample stream into two pieces of shared
//! state: the latest-fix slot the recorder snapshots, and a displayable
//! [`GpsStatus`]. The watch task is the only writer of both; readers clone
//! out through `parking_lot` locks.

use std::sync::Arc;

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::{Coordinate, GeofenceZone, LocationSample, ZoneClassification};
use crate::geofence;
use crate::providers::{LocationProvider, PermissionStatus, WatchError, WatchOptions};

/// Displayable GPS state, updated once per delivered sample.
#[derive(Debug, Clone, PartialEq)]
pub enum GpsStatus {
    /// Watching but no fix delivered yet
    WaitingForFix,
    /// Latest fix and its classification against the zone
    Fix {
        classification: ZoneClassification,
        sample: LocationSample,
    },
    /// Permission denied; terminal until platform settings change
    PermissionDenied,
}

impl GpsStatus {
    /// One-line status text for a UI banner.
    pub fn summary(&self) -> String {
        match self {
            GpsStatus::WaitingForFix => "Waiting for location fix...".to_string(),
            GpsStatus::PermissionDenied => "Location permission denied".to_string(),
            GpsStatus::Fix { classification, .. } => {
                if classification.inside_zone {
                    format!(
                        "GPS OK ({:.0} m): inside authorized zone",
                        classification.distance_m
                    )
                } else {
                    format!(
                        "GPS OK ({:.0} m): OUTSIDE AUTHORIZED ZONE",
                        classification.distance_m
                    )
                }
            }
        }
    }
}

/// Watches a position stream and keeps the latest valid fix.
///
/// Samples replace the slot in provider delivery order; no reordering or
/// monotonicity checks. Invalid coordinates are dropped with a warning and
/// leave both the slot and the status untouched.
pub struct LocationWatcher {
    zone: GeofenceZone,
    latest: Arc<RwLock<Option<LocationSample>>>,
    status: Arc<RwLock<GpsStatus>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl LocationWatcher {
    /// Create a watcher classifying fixes against `zone`.
    pub fn new(zone: GeofenceZone) -> Self {
        Self {
            zone,
            latest: Arc::new(RwLock::new(None)),
            status: Arc::new(RwLock::new(GpsStatus::WaitingForFix)),
            task: Mutex::new(None),
        }
    }

    /// Request permission and start consuming the provider's stream.
    ///
    /// A denied permission is terminal: the status switches to
    /// [`GpsStatus::PermissionDenied`] and no fixes will ever arrive.
    /// Starting again replaces a previous watch.
    pub async fn start(
        &self,
        provider: Arc<dyn LocationProvider>,
        options: WatchOptions,
    ) -> Result<(), WatchError> {
        if provider.request_permission().await == PermissionStatus::Denied {
            *self.status.write() = GpsStatus::PermissionDenied;
            return Err(WatchError::PermissionDenied);
        }

        let mut stream = match provider.watch_position(options).await {
            Ok(stream) => stream,
            Err(err) => {
                if err == WatchError::PermissionDenied {
                    *self.status.write() = GpsStatus::PermissionDenied;
                }
                return Err(err);
            }
        };

        let zone = self.zone.clone();
        let latest = self.latest.clone();
        let status = self.status.clone();

        let handle = tokio::spawn(async move {
            while let Some(sample) = stream.next().await {
                let coordinate = match Coordinate::new(
                    sample.coordinate.latitude,
                    sample.coordinate.longitude,
                ) {
                    Ok(coordinate) => coordinate,
                    Err(reason) => {
                        warn!("Dropping invalid location sample: {}", reason);
                        continue;
                    }
                };

                let classification = geofence::classify(&coordinate, &zone);
                *latest.write() = Some(sample.clone());
                *status.write() = GpsStatus::Fix {
                    classification,
                    sample,
                };
            }
            debug!("Location stream ended");
        });

        let previous = self.task.lock().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }

        Ok(())
    }

    /// Latest valid fix, if any has arrived.
    pub fn latest_sample(&self) -> Option<LocationSample> {
        self.latest.read().clone()
    }

    /// Current displayable status.
    pub fn status(&self) -> GpsStatus {
        self.status.read().clone()
    }

    /// Abort the watch task. The last fix stays readable.
    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for LocationWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
