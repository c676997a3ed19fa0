//! Postgres event store implementation using Diesel.
//!
//! This module implements the [`EventStore`] trait against a Postgres
//! database. Clock events land in the `clock_events` table, one row per
//! recorded check-in or check-out, and are never updated after insert.
//!
//! Writes go through an r2d2 connection pool and are retried with
//! exponential backoff when the failure is transient. Pending migrations
//! run once at store construction.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::{ClockEventRecord, ClockEventType, Coordinate, EmployeeId, EventId, StoredEvent};
use crate::store::error::{ErrorContext, StoreError, StoreResult};
use crate::store::event_store::{EventStore, MAX_LISTING_LIMIT};

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/store/postgres/migrations");

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Read the connection settings from the environment.
    ///
    /// `DATABASE_URL` (or `PG_DATABASE_URL`) is required; every `PG_*`
    /// tuning knob falls back to its default when unset or unparsable.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();
        Ok(Self {
            database_url,
            max_pool_size: env_parse("PG_POOL_MAX", defaults.max_pool_size),
            min_pool_size: env_parse("PG_POOL_MIN", defaults.min_pool_size),
            connection_timeout_sec: env_parse(
                "PG_CONN_TIMEOUT_SEC",
                defaults.connection_timeout_sec,
            ),
            idle_timeout_sec: env_parse("PG_IDLE_TIMEOUT_SEC", defaults.idle_timeout_sec),
            max_retries: env_parse("PG_MAX_RETRIES", defaults.max_retries),
            retry_delay_ms: env_parse("PG_RETRY_DELAY_MS", defaults.retry_delay_ms),
        })
    }
}

/// Diesel-backed event store for Postgres.
///
/// Cloning shares the pool. All Diesel calls run on the blocking thread
/// pool; the async trait surface never blocks a runtime worker.
#[derive(Clone, Debug)]
pub struct PostgresEventStore {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresEventStore {
    /// Connect, build the pool, and run pending migrations.
    pub fn new(config: PostgresConfig) -> StoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                StoreError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                StoreError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self { pool, config })
    }

    fn run_migrations(conn: &mut PgConnection) -> StoreResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            StoreError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;

        Ok(())
    }

    /// Run a Diesel operation on the blocking pool, retrying transient
    /// failures with exponential backoff up to `max_retries` times.
    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: Fn(&mut PgConnection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let base_delay = Duration::from_millis(self.config.retry_delay_ms);

        task::spawn_blocking(move || {
            let mut attempt: u32 = 0;
            loop {
                let result = pool
                    .get()
                    .map_err(|e| {
                        StoreError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1)),
                        )
                    })
                    .and_then(|mut conn| f(&mut conn));

                match result {
                    Ok(value) => return Ok(value),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        std::thread::sleep(base_delay * 2u32.pow(attempt));
                        attempt += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        })
        .await
        .map_err(|e| {
            StoreError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

fn map_diesel_error(err: diesel::result::Error) -> StoreError {
    StoreError::from(err)
}

/// Rebuild a domain record from a stored row.
///
/// Rows are validated on the way in, so a conversion failure here means the
/// table holds data this version of the code does not understand.
fn row_to_record(row: ClockEventRow) -> StoreResult<ClockEventRecord> {
    let event_type: ClockEventType = row.event_type.parse().map_err(|e: String| {
        StoreError::internal_with_context(
            e,
            ErrorContext::new("row_to_record")
                .with_entity("clock_event")
                .with_entity_id(row.event_id.to_string()),
        )
    })?;

    let coordinate = Coordinate::new(row.latitude, row.longitude).map_err(|e| {
        StoreError::internal_with_context(
            e,
            ErrorContext::new("row_to_record")
                .with_entity("clock_event")
                .with_entity_id(row.event_id.to_string()),
        )
    })?;

    Ok(ClockEventRecord {
        event_id: Some(EventId::new(row.event_id)),
        employee_id: EmployeeId::new(row.employee_id),
        event_type,
        activity_label: row.activity_label,
        coordinate,
        client_timestamp: row.client_timestamp,
        outside_zone: row.outside_zone,
        checksum: row.checksum,
    })
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn health_check(&self) -> StoreResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn append_event(
        &self,
        collection: &str,
        record: &ClockEventRecord,
    ) -> StoreResult<StoredEvent> {
        let collection = collection.to_string();
        let record = record.clone();

        self.with_conn(move |conn| {
            let new_row = NewClockEventRow {
                collection: collection.clone(),
                employee_id: record.employee_id.value().to_string(),
                event_type: record.event_type.as_str().to_string(),
                activity_label: record.activity_label.clone(),
                latitude: record.coordinate.latitude,
                longitude: record.coordinate.longitude,
                outside_zone: record.outside_zone,
                checksum: record.checksum.clone(),
                client_timestamp: record.client_timestamp,
            };

            let inserted: ClockEventRow = diesel::insert_into(clock_events::table)
                .values(&new_row)
                .returning(ClockEventRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;

            Ok(StoredEvent {
                event_id: EventId::new(inserted.event_id),
                recorded_at: inserted.created_at,
            })
        })
        .await
    }

    async fn events_for_employee(
        &self,
        collection: &str,
        employee_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<ClockEventRecord>> {
        let collection = collection.to_string();
        let employee_id = employee_id.to_string();
        let limit = limit.min(MAX_LISTING_LIMIT) as i64;

        self.with_conn(move |conn| {
            let rows = clock_events::table
                .filter(clock_events::collection.eq(collection.as_str()))
                .filter(clock_events::employee_id.eq(employee_id.as_str()))
                .select(ClockEventRow::as_select())
                .order((clock_events::created_at.desc(), clock_events::event_id.desc()))
                .limit(limit)
                .load::<ClockEventRow>(conn)
                .map_err(map_diesel_error)?;

            let mut events = Vec::with_capacity(rows.len());
            for row in rows {
                events.push(row_to_record(row)?);
            }
            Ok(events)
        })
        .await
    }
}
