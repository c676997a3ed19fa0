//! Event store trait for abstracting clock event persistence.
//!
//! This trait defines the interface for all persistence operations, allowing
//! different implementations (PostgreSQL, in-memory, etc.) to be swapped via
//! dependency injection. Instances are constructed explicitly and handed to
//! the services that need them; there is no process-global store.

use std::fmt;

use async_trait::async_trait;

use super::error::StoreResult;
use crate::api::{ClockEventRecord, StoredEvent};

/// Default collection that clock events are appended to.
pub const DEFAULT_COLLECTION: &str = "fichajes";

/// Maximum number of events returned by a single listing query.
pub const MAX_LISTING_LIMIT: usize = 100;

/// Store trait for clock event persistence.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust and allow
/// sharing across threads.
///
/// # Error Handling
/// All methods return `StoreResult<T>` which wraps either the expected
/// return type or a `StoreError` describing what went wrong.
#[async_trait]
pub trait EventStore: Send + Sync {
    // ==================== Health & Connection ====================

    /// Check if the store is reachable and healthy.
    ///
    /// # Returns
    /// - `Ok(true)` if the store is healthy
    /// - `Ok(false)` if the store is unhealthy but no error occurred
    /// - `Err(StoreError)` if an error occurred during the check
    async fn health_check(&self) -> StoreResult<bool>;

    // ==================== Clock Event Operations ====================

    /// Append a clock event record to a collection.
    ///
    /// This is a single best-effort write: the store either persists the
    /// record and returns a receipt, or fails. Callers see no transaction
    /// and must not assume any retry happened on their behalf.
    ///
    /// # Arguments
    /// * `collection` - Collection the event belongs to (e.g. "fichajes")
    /// * `record` - The record to persist; its `event_id` is ignored on input
    ///
    /// # Returns
    /// * `Ok(StoredEvent)` - Receipt with the assigned ID and write timestamp
    /// * `Err(StoreError)` - If the operation fails
    async fn append_event(
        &self,
        collection: &str,
        record: &ClockEventRecord,
    ) -> StoreResult<StoredEvent>;

    /// List an employee's events, newest first.
    ///
    /// # Arguments
    /// * `collection` - Collection to read from
    /// * `employee_id` - Employee whose events to list
    /// * `limit` - Maximum number of events; clamped to [`MAX_LISTING_LIMIT`]
    ///
    /// # Returns
    /// * `Ok(Vec<ClockEventRecord>)` - Events ordered by server write time,
    ///   most recent first; empty if the employee has none
    /// * `Err(StoreError)` - If the operation fails
    async fn events_for_employee(
        &self,
        collection: &str,
        employee_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<ClockEventRecord>>;
}

/// Opaque formatter so `Arc<dyn EventStore>` satisfies `Debug` bounds
/// (e.g. `Result::unwrap_err`) without requiring it of implementations.
impl fmt::Debug for dyn EventStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventStore")
    }
}
