//! Application state for the HTTP server.

use std::sync::Arc;

use crate::api::GeofenceZone;
use crate::store::EventStore;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Event store instance for persistence operations
    pub store: Arc<dyn EventStore>,
    /// Authorized zone reported by the zone endpoint
    pub zone: GeofenceZone,
    /// Store collection clock events are appended to
    pub collection: String,
}

impl AppState {
    /// Create a new application state.
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
}
