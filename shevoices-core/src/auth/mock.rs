//! In-memory collaborators for tests and offline hosts
//!
//! [`StaticSessionProvider`] serves a session held in memory,
//! [`RecordingSignOut`] records every sign-out call and can be told to fail,
//! [`RecordingNavigator`] records redirect targets. The terminal host uses
//! them when no site URL is configured.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{AuthError, Navigator, SessionHandle, SessionProvider, SignOut, SignOutOptions};

/// Serves whatever session was last set
#[derive(Debug, Default)]
pub struct StaticSessionProvider {
    session: Mutex<Option<SessionHandle>>,
}

impl StaticSessionProvider {
    pub fn new(session: SessionHandle) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    /// A provider with no session (unauthenticated)
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// Replace the session
    pub fn set(&self, session: SessionHandle) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = Some(session);
        }
    }

    /// Drop the session, as if it was revoked elsewhere
    pub fn clear(&self) {
        if let Ok(mut guard) = self.session.lock() {
            *guard = None;
        }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Result<Option<SessionHandle>, AuthError> {
        Ok(self.session.lock().ok().and_then(|guard| guard.clone()))
    }
}

/// Records sign-out calls
#[derive(Debug, Default)]
pub struct RecordingSignOut {
    calls: Mutex<Vec<SignOutOptions>>,
    failure: Mutex<Option<String>>,
    delay: Option<Duration>,
}

impl RecordingSignOut {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Mutex::new(Some(message.into())),
            ..Self::default()
        }
    }

    /// Delay each call, to simulate a slow network
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of sign-out calls so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Options of every call, in order
    pub fn calls(&self) -> Vec<SignOutOptions> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SignOut for RecordingSignOut {
    async fn sign_out(&self, options: SignOutOptions) -> Result<(), AuthError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(options);
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failure.lock().ok().and_then(|guard| guard.clone());
        match failure {
            Some(message) => Err(AuthError::Rejected(message)),
            None => Ok(()),
        }
    }
}

/// Records navigation targets
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets
            .lock()
            .map(|targets| targets.clone())
            .unwrap_or_default()
    }

    pub fn last_target(&self) -> Option<String> {
        self.targets
            .lock()
            .ok()
            .and_then(|targets| targets.last().cloned())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        if let Ok(mut targets) = self.targets.lock() {
            targets.push(target.to_string());
        }
    }
}
