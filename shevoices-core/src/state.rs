//! Guard state and event types

use serde::{Deserialize, Serialize};

/// Current state of the idle monitor, as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IdleState {
    /// User is active or idle below the warning threshold
    #[default]
    Idle,
    /// Countdown to a forced logout is running
    Warning { remaining_secs: u64 },
    /// Session was terminated; terminal
    LoggedOut { reason: LogoutReason },
}

impl IdleState {
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning { .. })
    }

    pub fn is_logged_out(&self) -> bool {
        matches!(self, Self::LoggedOut { .. })
    }

    /// Seconds left on the countdown, if one is running
    pub fn remaining_secs(&self) -> Option<u64> {
        match self {
            Self::Warning { remaining_secs } => Some(*remaining_secs),
            _ => None,
        }
    }
}

/// Why a forced logout happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoutReason {
    /// Idle budget ran out
    Inactivity,
    /// The session's absolute expiry passed, or the session disappeared
    SessionExpired,
    /// The user chose to log out
    Manual,
}

impl LogoutReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inactivity => "inactivity",
            Self::SessionExpired => "session_expired",
            Self::Manual => "manual",
        }
    }

    /// Message shown on the login page after the redirect
    pub fn message(&self) -> &'static str {
        match self {
            Self::Inactivity => "Session expired due to inactivity",
            Self::SessionExpired => "Your session has expired. Please sign in again",
            Self::Manual => "You have been signed out",
        }
    }
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted by a session guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardEvent {
    /// Idle threshold crossed, countdown begins
    WarningStarted { remaining_secs: u64 },
    /// Countdown tick
    Countdown { remaining_secs: u64 },
    /// Activity cancelled the countdown
    WarningDismissed,
    /// A forced logout won the race and is in progress
    LogoutStarted { reason: LogoutReason },
    /// The sign-out collaborator failed; falling back to a local redirect
    SignOutFailed { error: String },
    /// Logout finished
    LoggedOut {
        reason: LogoutReason,
        redirect: String,
    },
    /// Guard was torn down without a logout
    Stopped,
}
