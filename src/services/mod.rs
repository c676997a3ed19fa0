//! Service layer for the clock-in workflow.
//!
//! Services orchestrate the trait ports (positioning, identity, storage)
//! around the pure geofence math: the watcher lifts provider samples into
//! the latest-fix slot, the recorder turns a snapshot of that slot into a
//! persisted clock event, and the session manager gates both behind the
//! authentication state machine.

pub mod recorder;
pub mod session;
pub mod watcher;


pub use recorder::{ClockError, ClockEventRecorder, ClockReceipt};
pub use session::{SessionActivity, SessionError, SessionManager, SessionState};
pub use watcher::{GpsStatus, LocationWatcher};
