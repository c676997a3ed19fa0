//! Persistence module for clock event storage.
//!
//! This module provides abstractions for storage operations via the store
//! pattern, allowing different backends to be swapped easily.
//!
//! # Architecture
//!
//! The store module follows a layered architecture:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTTP API, session manager)          │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services/) - Business Logic             │
//! │  - Geofence classification                               │
//! │  - Clock event recording                                 │
//! │  - Checksum fingerprinting                               │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  EventStore Trait (event_store.rs) - Abstract Interface │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │              Local Event Store                │
//!     │                (in-memory)                    │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! # Store Pattern
//! The module includes:
//! - `event_store`: Trait definition for persistence operations
//! - `postgres`: Postgres implementation with Diesel ORM
//! - `local`: In-memory implementation for unit testing and local development
//! - `factory`: Factory for creating store instances
//!
//! There is no process-global store. Instances are created through the
//! factory and handed to the services that need them.
//!
//! # Recommended Usage
//!
//! ```ignore
//! use fichaje_rust::store::{PostgresConfig, StoreFactory, StoreType};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PostgresConfig::from_env()?;
//!     let store = StoreFactory::create(StoreType::Postgres, Some(&config)).await?;
//!
//!     let healthy = store.health_check().await?;
//!     assert!(healthy);
//!     Ok(())
//! }
//! ```
//!
//! # Postgres Implementation
//! PostgreSQL-specific code is in `postgres`.

// Feature flag priority: postgres > local
// When multiple features are enabled (e.g., --all-features), postgres takes precedence.
#[cfg(not(any(feature = "postgres-store", feature = "local-store")))]
compile_error!("Enable at least one event store backend feature.");

pub mod checksum;
pub mod error;
pub mod event_store;
pub mod factory;
pub mod local;
#[cfg(feature = "postgres-store")]
pub mod postgres;

// Postgres config is colocated with the store implementation.
#[cfg(feature = "postgres-store")]
pub use postgres::{PostgresConfig, PostgresEventStore};
#[cfg(not(feature = "postgres-store"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}

// ==================== Store Pattern Exports ====================

pub use checksum::calculate_checksum;
pub use error::{ErrorContext, StoreError, StoreResult};
pub use event_store::{EventStore, DEFAULT_COLLECTION, MAX_LISTING_LIMIT};
pub use factory::{StoreBuilder, StoreFactory, StoreType};
pub use local::LocalEventStore;
