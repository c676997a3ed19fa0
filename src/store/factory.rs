//! Event store factory for dependency injection.
//!
//! This module provides utilities for creating and configuring event store
//! instances based on runtime configuration. Stores are always returned as
//! `Arc<dyn EventStore>` so callers can inject them into the services that
//! need them.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use super::event_store::EventStore;
use super::local::LocalEventStore;
#[cfg(feature = "postgres-store")]
use super::postgres::PostgresEventStore;
use super::error::{StoreError, StoreResult};
use super::PostgresConfig;
use crate::config::FichajeConfig;

/// Event store type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreType {
    /// Postgres + Diesel implementation
    Postgres,
    /// In-memory local store
    Local,
}

impl FromStr for StoreType {
    type Err = String;

    /// Parse store type from string.
    ///
    /// # Arguments
    /// * `s` - String representation ("postgres", "local")
    ///
    /// # Returns
    /// * `Ok(StoreType)` if valid
    /// * `Err` if invalid
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "local" => Ok(Self::Local),
            _ => Err(format!("Unknown store type: {}", s)),
        }
    }
}

impl StoreType {
    /// Get store type from environment variable.
    ///
    /// Reads `EVENT_STORE_TYPE` environment variable. Defaults to Postgres if
    /// a database URL is present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("EVENT_STORE_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATABASE_URL").is_ok() || std::env::var("PG_DATABASE_URL").is_ok() {
            Self::Postgres
        } else {
            Self::Local
        }
    }
}

/// Factory for creating event store instances.
///
/// This factory provides a centralized way to create store instances with
/// proper initialization and configuration.
///
/// # Example
/// ```ignore
/// use fichaje_rust::store::{PostgresConfig, StoreFactory, StoreType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Create Postgres store
///     let config = PostgresConfig::from_env()?;
///     let _pg_store = StoreFactory::create(StoreType::Postgres, Some(&config)).await?;
///
///     // Create local store
///     let local_store = StoreFactory::create_local();
///
///     Ok(())
/// }
/// ```
pub struct StoreFactory;

impl StoreFactory {
    /// Create a store instance based on type.
    ///
    /// # Arguments
    /// * `store_type` - Type of store to create
    /// * `postgres_config` - Optional database configuration (required for Postgres)
    ///
    /// # Returns
    /// * `Ok(Arc<dyn EventStore>)` - Boxed store instance
    /// * `Err(StoreError)` - If creation fails
    pub async fn create(
        store_type: StoreType,
        postgres_config: Option<&PostgresConfig>,
    ) -> StoreResult<Arc<dyn EventStore>> {
        match store_type {
            StoreType::Postgres => {
                #[cfg(feature = "postgres-store")]
                {
                    let config = postgres_config.ok_or_else(|| {
                        StoreError::configuration("Postgres store requires PostgresConfig")
                    })?;
                    let pg = Self::create_postgres(config).await?;
                    Ok(pg as Arc<dyn EventStore>)
                }
                #[cfg(not(feature = "postgres-store"))]
                {
                    let _ = postgres_config;
                    Err(StoreError::configuration(
                        "Postgres store feature not enabled",
                    ))
                }
            }
            StoreType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a Postgres event store.
    ///
    /// # Arguments
    /// * `config` - Postgres configuration
    ///
    /// # Returns
    /// * `Ok(Arc<PostgresEventStore>)` - Postgres store instance
    /// * `Err(StoreError)` - If initialization fails
    #[cfg(feature = "postgres-store")]
    pub async fn create_postgres(
        config: &PostgresConfig,
    ) -> StoreResult<Arc<PostgresEventStore>> {
        let store = PostgresEventStore::new(config.clone())?;
        Ok(Arc::new(store))
    }

    /// Create an in-memory local event store.
    ///
    /// # Returns
    /// Boxed local store instance
    pub fn create_local() -> Arc<dyn EventStore> {
        Arc::new(LocalEventStore::new())
    }

    /// Create a store from environment configuration.
    ///
    /// Reads `EVENT_STORE_TYPE` environment variable to determine which store
    /// to create. Defaults to Postgres if a database URL is set, otherwise
    /// Local.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn EventStore>)` - Store instance
    /// * `Err(StoreError)` - If creation fails
    pub async fn from_env() -> StoreResult<Arc<dyn EventStore>> {
        let store_type = StoreType::from_env();

        match store_type {
            StoreType::Postgres => {
                #[cfg(feature = "postgres-store")]
                {
                    let config =
                        PostgresConfig::from_env().map_err(StoreError::configuration)?;
                    let pg = Self::create_postgres(&config).await?;
                    Ok(pg as Arc<dyn EventStore>)
                }
                #[cfg(not(feature = "postgres-store"))]
                {
                    Err(StoreError::configuration(
                        "Postgres store feature not enabled",
                    ))
                }
            }
            StoreType::Local => Ok(Self::create_local()),
        }
    }

    /// Create a store from a TOML configuration file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the fichaje.toml configuration file
    ///
    /// # Returns
    /// * `Ok(Arc<dyn EventStore>)` - Store instance
    /// * `Err(StoreError)` - If creation fails
    pub async fn from_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> StoreResult<Arc<dyn EventStore>> {
        let config = FichajeConfig::from_file(config_path)
            .map_err(|e| StoreError::configuration(e.to_string()))?;
        Self::from_app_config(&config).await
    }

    /// Create a store from the default configuration file location.
    ///
    /// Searches for `fichaje.toml` in standard locations and creates the
    /// appropriate store instance.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn EventStore>)` - Store instance
    /// * `Err(StoreError)` - If creation fails
    pub async fn from_default_config() -> StoreResult<Arc<dyn EventStore>> {
        let config = FichajeConfig::from_default_location()
            .map_err(|e| StoreError::configuration(e.to_string()))?;
        Self::from_app_config(&config).await
    }

    /// Create a store from a FichajeConfig instance.
    ///
    /// # Arguments
    /// * `config` - Application configuration
    ///
    /// # Returns
    /// * `Ok(Arc<dyn EventStore>)` - Store instance
    /// * `Err(StoreError)` - If creation fails
    pub async fn from_app_config(config: &FichajeConfig) -> StoreResult<Arc<dyn EventStore>> {
        let store_type = config
            .store_type()
            .map_err(|e| StoreError::configuration(format!("Invalid store type: {}", e)))?;

        match store_type {
            StoreType::Postgres => {
                #[cfg(feature = "postgres-store")]
                {
                    let pg_config = config
                        .to_postgres_config()
                        .map_err(|e| StoreError::configuration(e.to_string()))?
                        .ok_or_else(|| {
                            StoreError::configuration(
                                "Postgres store requires database configuration",
                            )
                        })?;
                    let pg = Self::create_postgres(&pg_config).await?;
                    Ok(pg as Arc<dyn EventStore>)
                }
                #[cfg(not(feature = "postgres-store"))]
                {
                    Err(StoreError::configuration(
                        "Postgres store feature not enabled",
                    ))
                }
            }
            StoreType::Local => Ok(Self::create_local()),
        }
    }
}

/// Builder for configuring event store creation.
///
/// This provides a fluent API for configuring and creating store instances.
///
/// # Example
/// ```ignore
/// use fichaje_rust::store::{PostgresConfig, StoreBuilder, StoreType};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     // Requires the `postgres-store` feature.
///     let config = PostgresConfig::from_env()?;
///
///     let store = StoreBuilder::new()
///         .store_type(StoreType::Postgres)
///         .postgres_config(config)
///         .build()
///         .await?;
///
///     Ok(())
/// }
/// ```
pub struct StoreBuilder {
    store_type: StoreType,
    #[cfg(feature = "postgres-store")]
    postgres_config: Option<PostgresConfig>,
}

impl StoreBuilder {
    /// Create a new store builder with default settings.
    ///
    /// Defaults to Postgres if configured, otherwise Local.
    pub fn new() -> Self {
        Self {
            store_type: StoreType::from_env(),
            #[cfg(feature = "postgres-store")]
            postgres_config: None,
        }
    }

    /// Set the store type.
    pub fn store_type(mut self, store_type: StoreType) -> Self {
        self.store_type = store_type;
        self
    }

    /// Set the Postgres configuration.
    #[cfg(feature = "postgres-store")]
    pub fn postgres_config(mut self, config: PostgresConfig) -> Self {
        self.postgres_config = Some(config);
        self
    }

    /// Load configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, StoreError> {
        self.store_type = StoreType::from_env();

        if self.store_type == StoreType::Postgres {
            #[cfg(feature = "postgres-store")]
            {
                let config = PostgresConfig::from_env().map_err(StoreError::configuration)?;
                self.postgres_config = Some(config);
            }
            #[cfg(not(feature = "postgres-store"))]
            {
                return Err(StoreError::configuration(
                    "Postgres store feature not enabled",
                ));
            }
        }

        Ok(self)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `config_path` - Path to the fichaje.toml configuration file
    ///
    /// # Returns
    /// * `Ok(Self)` - Builder with loaded configuration
    /// * `Err(StoreError)` - If file cannot be read or parsed
    pub fn from_config_file<P: AsRef<Path>>(
        mut self,
        config_path: P,
    ) -> Result<Self, StoreError> {
        let app_config = FichajeConfig::from_file(config_path)
            .map_err(|e| StoreError::configuration(e.to_string()))?;

        self.store_type = app_config
            .store_type()
            .map_err(|e| StoreError::configuration(format!("Invalid store type: {}", e)))?;

        if self.store_type == StoreType::Postgres {
            #[cfg(feature = "postgres-store")]
            {
                let config = app_config
                    .to_postgres_config()
                    .map_err(|e| StoreError::configuration(e.to_string()))?
                    .ok_or_else(|| {
                        StoreError::configuration(
                            "Postgres store requires database configuration",
                        )
                    })?;
                self.postgres_config = Some(config);
            }
            #[cfg(not(feature = "postgres-store"))]
            {
                return Err(StoreError::configuration(
                    "Postgres store feature not enabled",
                ));
            }
        }

        Ok(self)
    }

    /// Build the store instance.
    ///
    /// # Returns
    /// * `Ok(Arc<dyn EventStore>)` - Configured store
    /// * `Err(StoreError)` - If build fails
    pub async fn build(self) -> StoreResult<Arc<dyn EventStore>> {
        #[cfg(feature = "postgres-store")]
        let pg_config = self.postgres_config.as_ref();
        #[cfg(not(feature = "postgres-store"))]
        let pg_config = None;

        StoreFactory::create(self.store_type, pg_config).await
    }
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
