//! In-memory local event store implementation.
//!
//! This module provides a local implementation of the `EventStore` trait
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap and Vec structures, providing fast, deterministic,
//! and isolated execution.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{StoreError, StoreResult};
use super::event_store::{EventStore, MAX_LISTING_LIMIT};
use crate::api::{ClockEventRecord, EventId, StoredEvent};

/// In-memory local event store.
///
/// This implementation stores all appended events in memory per collection,
/// making it ideal for unit tests and local development that need isolation
/// and speed. The health flag can be toggled to simulate an unreachable
/// backend.
///
/// # Example
/// ```no_run
/// use chrono::Utc;
/// use fichaje_rust::api::{ClockEventRecord, ClockEventType, Coordinate, EmployeeId};
/// use fichaje_rust::store::{EventStore, LocalEventStore, DEFAULT_COLLECTION};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalEventStore::new();
/// let record = ClockEventRecord::new(
///     EmployeeId::new("emp-001"),
///     ClockEventType::CheckIn,
///     "general work".to_string(),
///     Coordinate::new(4.533, -75.675)?,
///     Utc::now(),
///     false,
/// );
/// let receipt = store.append_event(DEFAULT_COLLECTION, &record).await?;
/// assert_eq!(receipt.event_id.value(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalEventStore {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    // Events per collection, in server write order
    collections: HashMap<String, Vec<ClockEventRecord>>,

    // ID counter
    next_event_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            collections: HashMap::new(),
            next_event_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalEventStore {
    /// Create a new empty local event store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Append an event directly, bypassing the async trait.
    ///
    /// This is a helper method for setting up test data. The record is
    /// assigned an ID automatically.
    ///
    /// # Arguments
    /// * `collection` - Collection to append to
    /// * `record` - Record to append (`event_id` will be overwritten)
    ///
    /// # Returns
    /// The ID assigned to the event
    pub fn append_event_impl(&self, collection: &str, record: ClockEventRecord) -> EventId {
        let mut data = self.data.write();
        let event_id = EventId::new(data.next_event_id);
        data.next_event_id += 1;

        let mut stored = record;
        stored.event_id = Some(event_id);
        data.collections
            .entry(collection.to_string())
            .or_default()
            .push(stored);

        event_id
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write();
        data.is_healthy = healthy;
    }

    /// Clear all data from the store.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of events stored in a collection.
    pub fn event_count(&self, collection: &str) -> usize {
        self.data
            .read()
            .collections
            .get(collection)
            .map(|events| events.len())
            .unwrap_or(0)
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> StoreResult<()> {
        let data = self.data.read();
        if !data.is_healthy {
            return Err(StoreError::connection("Event store is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for LocalEventStore {
    async fn health_check(&self) -> StoreResult<bool> {
        let data = self.data.read();
        Ok(data.is_healthy)
    }

    async fn append_event(
        &self,
        collection: &str,
        record: &ClockEventRecord,
    ) -> StoreResult<StoredEvent> {
        self.check_health()?;

        let event_id = self.append_event_impl(collection, record.clone());
        Ok(StoredEvent {
            event_id,
            recorded_at: Utc::now(),
        })
    }

    async fn events_for_employee(
        &self,
        collection: &str,
        employee_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<ClockEventRecord>> {
        self.check_health()?;

        let data = self.data.read();
        let events = data
            .collections
            .get(collection)
            .map(|events| {
                events
                    .iter()
                    .rev()
                    .filter(|event| event.employee_id.value() == employee_id)
                    .take(limit.min(MAX_LISTING_LIMIT))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ClockEventType, Coordinate, EmployeeId};

    fn sample_record(employee: &str, event_type: ClockEventType) -> ClockEventRecord {
        ClockEventRecord::new(
            EmployeeId::new(employee),
            event_type,
            "general work".to_string(),
            Coordinate::new(4.533, -75.675).unwrap(),
            Utc::now(),
            false,
        )
    }

    #[tokio::test]
    async fn test_append_assigns_sequential_ids() {
        let store = LocalEventStore::new();

        let first = store
            .append_event("fichajes", &sample_record("emp-001", ClockEventType::CheckIn))
            .await
            .unwrap();
        let second = store
            .append_event("fichajes", &sample_record("emp-001", ClockEventType::CheckOut))
            .await
            .unwrap();

        assert_eq!(first.event_id.value(), 1);
        assert_eq!(second.event_id.value(), 2);
        assert_eq!(store.event_count("fichajes"), 2);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let store = LocalEventStore::new();
        store.append_event_impl("fichajes", sample_record("emp-001", ClockEventType::CheckIn));
        store.append_event_impl("fichajes", sample_record("emp-001", ClockEventType::CheckOut));

        let events = store
            .events_for_employee("fichajes", "emp-001", 10)
            .await
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, ClockEventType::CheckOut);
        assert_eq!(events[1].event_type, ClockEventType::CheckIn);
    }

    #[tokio::test]
    async fn test_listing_filters_by_employee() {
        let store = LocalEventStore::new();
        store.append_event_impl("fichajes", sample_record("emp-001", ClockEventType::CheckIn));
        store.append_event_impl("fichajes", sample_record("emp-002", ClockEventType::CheckIn));

        let events = store
            .events_for_employee("fichajes", "emp-002", 10)
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].employee_id.value(), "emp-002");
    }

    #[tokio::test]
    async fn test_unhealthy_store_rejects_writes() {
        let store = LocalEventStore::new();
        store.set_healthy(false);

        assert_eq!(store.health_check().await.unwrap(), false);

        let result = store
            .append_event("fichajes", &sample_record("emp-001", ClockEventType::CheckIn))
            .await;
        assert!(matches!(result, Err(StoreError::ConnectionError { .. })));
        assert_eq!(store.event_count("fichajes"), 0);
    }

    #[tokio::test]
    async fn test_clear_keeps_health_flag() {
        let store = LocalEventStore::new();
        store.append_event_impl("fichajes", sample_record("emp-001", ClockEventType::CheckIn));
        store.set_healthy(false);
        store.clear();

        assert_eq!(store.event_count("fichajes"), 0);
        assert_eq!(store.health_check().await.unwrap(), false);
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = LocalEventStore::new();
        store.append_event_impl("fichajes", sample_record("emp-001", ClockEventType::CheckIn));
        store.append_event_impl("otros", sample_record("emp-001", ClockEventType::CheckIn));

        let events = store
            .events_for_employee("otros", "emp-001", 10)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(store.event_count("fichajes"), 1);
    }
}
