//! Identity provider port.
//!
//! Authentication lives outside the core. The [`IdentityProvider`] trait
//! covers the three interactions the application needs: credential sign-in,
//! sign-out, and a stream of identity changes that also reports the current
//! identity at subscription time.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use futures::stream::BoxStream;
use parking_lot::RwLock;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::api::EmployeeId;

/// Signed-in identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Stable employee identifier used on every clock event
    pub employee_id: EmployeeId,
    /// Address the account signed in with
    pub email: String,
}

/// Authentication failures, worded for direct display.
///
/// Every variant leaves the session unauthenticated and retryable; none of
/// them is terminal for the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Incorrect email or password")]
    WrongCredentials,
    #[error("Too many failed attempts, try again later")]
    TooManyAttempts,
    #[error("Authentication failed: {0}")]
    Unknown(String),
}

/// Access to the authentication backend.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for an identity.
    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<Identity, AuthError>;

    /// Drop the current identity.
    async fn sign_out(&self);

    /// Stream of identity changes.
    ///
    /// Emits the current identity (possibly `None`) immediately on
    /// subscription, then one item per sign-in or sign-out.
    fn identity_changes(&self) -> BoxStream<'static, Option<Identity>>;
}

/// Consecutive failures tolerated before sign-in is throttled.
const MAX_FAILED_ATTEMPTS: u32 = 5;

/// In-process identity backend for tests and local development.
///
/// Accounts are registered up front; the throttling behavior of the real
/// backend is emulated with a consecutive-failure counter.
#[derive(Debug)]
pub struct SimulatedIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<Identity>>,
    changes: broadcast::Sender<Option<Identity>>,
    failed_attempts: AtomicU32,
}

#[derive(Debug, Clone)]
struct Account {
    secret: String,
    identity: Identity,
}

impl SimulatedIdentityProvider {
    /// Create a provider with no registered accounts and no identity.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            changes,
            failed_attempts: AtomicU32::new(0),
        }
    }

    /// Register an account the provider will accept.
    pub fn register(
        &self,
        email: impl Into<String>,
        secret: impl Into<String>,
        employee_id: impl Into<String>,
    ) {
        let email = email.into();
        let identity = Identity {
            employee_id: EmployeeId::new(employee_id),
            email: email.clone(),
        };
        self.accounts.write().insert(
            email,
            Account {
                secret: secret.into(),
                identity,
            },
        );
    }

    /// Identity currently signed in, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.current.read().clone()
    }

    fn publish(&self, identity: Option<Identity>) {
        *self.current.write() = identity.clone();
        // No subscribers is fine.
        let _ = self.changes.send(identity);
    }
}

impl Default for SimulatedIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for SimulatedIdentityProvider {
    async fn authenticate(&self, identifier: &str, secret: &str) -> Result<Identity, AuthError> {
        if !identifier.contains('@') {
            return Err(AuthError::InvalidEmail);
        }

        if self.failed_attempts.load(Ordering::Relaxed) >= MAX_FAILED_ATTEMPTS {
            return Err(AuthError::TooManyAttempts);
        }

        let account = self.accounts.read().get(identifier).cloned();
        match account {
            Some(account) if account.secret == secret => {
                self.failed_attempts.store(0, Ordering::Relaxed);
                self.publish(Some(account.identity.clone()));
                Ok(account.identity)
            }
            _ => {
                self.failed_attempts.fetch_add(1, Ordering::Relaxed);
                Err(AuthError::WrongCredentials)
            }
        }
    }

    async fn sign_out(&self) {
        self.publish(None);
    }

    fn identity_changes(&self) -> BoxStream<'static, Option<Identity>> {
        // Subscribe before reading the snapshot so a concurrent change is
        // delivered twice rather than missed.
        let mut rx = self.changes.subscribe();
        let snapshot = self.current.read().clone();

        let stream = async_stream::stream! {
            yield snapshot;
            loop {
                match rx.recv().await {
                    Ok(identity) => yield identity,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        };

        Box::pin(stream)
    }
}
