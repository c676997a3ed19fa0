//! External collaborator ports.
//!
//! The application core never talks to platform SDKs directly. Positioning
//! and authentication are reached through the narrow traits defined here,
//! injected as `Arc<dyn ...>` so tests can substitute the simulated
//! implementations.

pub mod identity;
pub mod location;

pub use identity::{AuthError, Identity, IdentityProvider, SimulatedIdentityProvider};
pub use location::{
    LocationProvider, PermissionStatus, SampleStream, SimulatedLocationProvider, WatchError,
    WatchOptions,
};
