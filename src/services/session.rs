//! Authentication and recording state machine.
//!
//! Makes the session lifecycle explicit instead of scattering it across UI
//! flags: `Initializing` until the identity provider reports, then
//! `Unauthenticated` or `Authenticated`, and within an authenticated session
//! `Idle` or `RecordingEvent` while a clock write is in flight. The activity
//! sub-state is what keeps a second clock event from being dispatched while
//! one is already on the wire.

use std::sync::Arc;

use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{ClockEventType, EmployeeId};
use crate::providers::{AuthError, Identity, IdentityProvider};
use crate::services::recorder::{ClockError, ClockEventRecorder, ClockReceipt};
use crate::services::watcher::LocationWatcher;

/// What an authenticated session is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionActivity {
    /// Ready to record
    Idle,
    /// A clock write is in flight; further records are rejected
    RecordingEvent,
}

/// Session lifecycle state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Waiting for the identity provider's first report
    Initializing,
    /// No identity; sign-in required
    Unauthenticated,
    /// Signed in
    Authenticated {
        identity: Identity,
        activity: SessionActivity,
    },
}

/// Errors surfaced by session-level operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not authenticated")]
    NotAuthenticated,
    #[error("Another clock event is being recorded")]
    RecordingInProgress,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// Drives the session state machine.
///
/// State changes come from two places: the identity provider's change stream
/// (process start, sign-in, sign-out) and the begin/finish bracket around
/// each recording. All transitions happen under one write lock, so two
/// concurrent `record_event` calls cannot both pass the idle check.
pub struct SessionManager {
    identity_provider: Arc<dyn IdentityProvider>,
    recorder: Arc<ClockEventRecorder>,
    watcher: Arc<LocationWatcher>,
    state: Arc<RwLock<SessionState>>,
    identity_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    /// Create a manager in the `Initializing` state.
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        recorder: Arc<ClockEventRecorder>,
        watcher: Arc<LocationWatcher>,
    ) -> Self {
        Self {
            identity_provider,
            recorder,
            watcher,
            state: Arc::new(RwLock::new(SessionState::Initializing)),
            identity_task: Mutex::new(None),
        }
    }

    /// Start following the identity provider's change stream.
    ///
    /// The first item resolves `Initializing`; later items track sign-ins
    /// and sign-outs made outside this manager. Calling `start` again
    /// replaces the previous subscription.
    pub fn start(&self) {
        let mut changes = self.identity_provider.identity_changes();
        let state = self.state.clone();

        let handle = tokio::spawn(async move {
            while let Some(change) = changes.next().await {
                let mut state = state.write();
                match change {
                    Some(identity) => {
                        // A re-announcement of the identity that is mid-write
                        // must not clobber the recording activity.
                        let mid_write = matches!(
                            &*state,
                            SessionState::Authenticated {
                                identity: current,
                                activity: SessionActivity::RecordingEvent,
                            } if current.employee_id == identity.employee_id
                        );
                        if !mid_write {
                            *state = SessionState::Authenticated {
                                identity,
                                activity: SessionActivity::Idle,
                            };
                        }
                    }
                    None => *state = SessionState::Unauthenticated,
                }
            }
        });

        let previous = self.identity_task.lock().replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Authenticate with the identity provider.
    ///
    /// On failure the state stays `Unauthenticated` and the attempt can be
    /// repeated with corrected credentials.
    pub async fn sign_in(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Identity, SessionError> {
        match self.identity_provider.authenticate(identifier, secret).await {
            Ok(identity) => {
                *self.state.write() = SessionState::Authenticated {
                    identity: identity.clone(),
                    activity: SessionActivity::Idle,
                };
                info!("Signed in as {}", identity.employee_id);
                Ok(identity)
            }
            Err(err) => {
                let mut state = self.state.write();
                if matches!(*state, SessionState::Initializing) {
                    *state = SessionState::Unauthenticated;
                }
                Err(SessionError::Auth(err))
            }
        }
    }

    /// Sign out and drop to `Unauthenticated`.
    pub async fn sign_out(&self) {
        self.identity_provider.sign_out().await;
        *self.state.write() = SessionState::Unauthenticated;
        info!("Signed out");
    }

    /// Record a clock event for the signed-in employee.
    ///
    /// Requires `Authenticated { Idle }`. While the write is in flight the
    /// state shows `RecordingEvent` and a concurrent call fails with
    /// [`SessionError::RecordingInProgress`]. The location fix is snapshotted
    /// from the watcher at call time.
    pub async fn record_event(
        &self,
        event_type: ClockEventType,
        activity_label: &str,
    ) -> Result<ClockReceipt, SessionError> {
        let employee_id = self.begin_recording()?;

        let result = self
            .recorder
            .record_event(
                &employee_id,
                event_type,
                activity_label,
                self.watcher.latest_sample(),
            )
            .await;

        self.finish_recording();
        result.map_err(SessionError::Clock)
    }

    /// Stop following identity changes.
    pub fn stop(&self) {
        if let Some(handle) = self.identity_task.lock().take() {
            handle.abort();
        }
    }

    fn begin_recording(&self) -> Result<EmployeeId, SessionError> {
        let mut state = self.state.write();
        match &mut *state {
            SessionState::Authenticated { identity, activity } => match activity {
                SessionActivity::RecordingEvent => Err(SessionError::RecordingInProgress),
                SessionActivity::Idle => {
                    *activity = SessionActivity::RecordingEvent;
                    Ok(identity.employee_id.clone())
                }
            },
            _ => Err(SessionError::NotAuthenticated),
        }
    }

    fn finish_recording(&self) {
        let mut state = self.state.write();
        if let SessionState::Authenticated { activity, .. } = &mut *state {
            *activity = SessionActivity::Idle;
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.stop();
    }
}
