//! # Fichaje Rust Backend
//!
//! Work-site time-clock engine.
//!
//! This crate provides the core of a mobile time-clock ("fichaje") system:
//! employees authenticate, a location provider tracks their position, each
//! fix is classified against an authorized job-site geofence, and clock-in /
//! clock-out events are recorded to a persistent event store. A REST API via
//! Axum exposes recording and listing for clients.
//!
//! ## Features
//!
//! - **Geofence Evaluation**: Haversine distance and inclusive-boundary zone
//!   classification
//! - **Clock Event Recording**: Immutable event records with a single
//!   best-effort persistence write
//! - **Location Watching**: Provider sample stream into a latest-fix slot
//!   with a displayable GPS status
//! - **Session State Machine**: Explicit authentication and recording states
//! - **Event Storage**: In-memory and PostgreSQL backends behind one trait
//! - **HTTP API**: RESTful endpoints for clients
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Core domain types (coordinates, zones, event records)
//! - [`geofence`]: Pure distance and classification math
//! - [`models`]: Event JSON parsing, validation, and checksums
//! - [`config`]: TOML and environment configuration
//! - [`providers`]: Location and identity trait ports with simulated
//!   implementations
//! - [`services`]: Watcher, recorder, and session manager
//! - [`store`]: Event persistence layer with store pattern
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - StoreError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod config;
pub mod geofence;
pub mod models;

pub mod providers;

pub mod services;
pub mod store;

#[cfg(feature = "http-server")]
pub mod http;
