//! Absolute session expiry checks
//!
//! The session's `expires_at` is a wall-clock timestamp, but the checker
//! measures time on the monotonic clock: it pairs a wall-clock reading with a
//! monotonic one when constructed and derives "now" from the monotonic side.
//! Wall-clock adjustments during the scope's lifetime do not move the check.
//!
//! This check is advisory. It redirects the user near expiry; the auth
//! service must still reject expired credentials on its own.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::auth::SessionHandle;

/// Outcome of one expiry check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryStatus {
    /// Session is valid for `remaining`
    Valid { remaining: Duration },
    /// `now >= expires_at`
    Expired,
    /// The collaborator reports no session
    Absent,
}

impl ExpiryStatus {
    /// Whether this status ends the authenticated scope
    pub fn requires_logout(&self) -> bool {
        !matches!(self, Self::Valid { .. })
    }
}

/// Compares a session's absolute expiry with the current time
#[derive(Debug, Clone, Copy)]
pub struct SessionExpiryChecker {
    wall_origin: DateTime<Utc>,
    mono_origin: Instant,
}

impl SessionExpiryChecker {
    /// Anchor the checker at the current wall and monotonic time
    pub fn new() -> Self {
        Self::anchored_at(Utc::now(), Instant::now())
    }

    /// Anchor the checker at explicit readings
    pub fn anchored_at(wall_origin: DateTime<Utc>, mono_origin: Instant) -> Self {
        Self {
            wall_origin,
            mono_origin,
        }
    }

    /// Current wall-clock time as derived from the monotonic clock
    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.mono_origin.elapsed())
            .unwrap_or(chrono::Duration::zero());
        self.wall_origin + elapsed
    }

    pub fn is_expired(&self, session: &SessionHandle) -> bool {
        self.now() >= session.expires_at
    }

    pub fn check(&self, session: Option<&SessionHandle>) -> ExpiryStatus {
        let Some(session) = session else {
            return ExpiryStatus::Absent;
        };
        let now = self.now();
        if now >= session.expires_at {
            return ExpiryStatus::Expired;
        }
        let remaining = (session.expires_at - now).to_std().unwrap_or(Duration::ZERO);
        ExpiryStatus::Valid { remaining }
    }
}

impl Default for SessionExpiryChecker {
    fn default() -> Self {
        Self::new()
    }
}
