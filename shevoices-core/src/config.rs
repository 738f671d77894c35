//! Configuration for the session guard

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Timing and redirect configuration for a [`SessionGuard`](crate::SessionGuard).
///
/// All durations are in milliseconds. `idle_timeout_ms` is the total idle
/// budget in both modes: with the warning enabled the last `countdown_ms` of
/// it is shown as a countdown, without it the session ends silently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuardConfig {
    /// Total idle time before a forced logout
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,

    /// Length of the warning countdown at the end of the idle budget
    #[serde(default = "default_countdown_ms")]
    pub countdown_ms: u64,

    /// Whether a warning phase precedes the logout
    #[serde(default = "default_warning_enabled")]
    pub warning_enabled: bool,

    /// How often idle time is re-evaluated
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// How often the session's absolute expiry is checked
    #[serde(default = "default_check_interval_ms")]
    pub session_check_interval_ms: u64,

    /// Login page that forced logouts redirect to
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Longest a sign-out call may take before the redirect is done locally
    #[serde(default = "default_sign_out_timeout_ms")]
    pub sign_out_timeout_ms: u64,
}

fn default_idle_timeout_ms() -> u64 {
    30_000
}

fn default_countdown_ms() -> u64 {
    10_000
}

fn default_warning_enabled() -> bool {
    true
}

fn default_check_interval_ms() -> u64 {
    1_000
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_sign_out_timeout_ms() -> u64 {
    5_000
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
            countdown_ms: default_countdown_ms(),
            warning_enabled: default_warning_enabled(),
            check_interval_ms: default_check_interval_ms(),
            session_check_interval_ms: default_check_interval_ms(),
            login_path: default_login_path(),
            sign_out_timeout_ms: default_sign_out_timeout_ms(),
        }
    }
}

impl GuardConfig {
    /// Two-phase config: silent for `warn_after`, then a `countdown` warning
    pub fn two_phase(warn_after: Duration, countdown: Duration) -> Self {
        let countdown_ms = duration_ms(countdown);
        Self {
            idle_timeout_ms: duration_ms(warn_after).saturating_add(countdown_ms),
            countdown_ms,
            warning_enabled: true,
            ..Self::default()
        }
    }

    /// Single-phase config: logout at `idle_timeout` with no warning
    pub fn single_phase(idle_timeout: Duration) -> Self {
        Self {
            idle_timeout_ms: duration_ms(idle_timeout),
            warning_enabled: false,
            ..Self::default()
        }
    }

    /// Set the idle-check polling interval
    #[must_use]
    pub fn with_check_interval(mut self, interval: Duration) -> Self {
        self.check_interval_ms = duration_ms(interval);
        self
    }

    /// Set the session-expiry polling interval
    #[must_use]
    pub fn with_session_check_interval(mut self, interval: Duration) -> Self {
        self.session_check_interval_ms = duration_ms(interval);
        self
    }

    /// Set the login path used in redirect targets
    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Set how long a sign-out call may run before giving up on it
    #[must_use]
    pub fn with_sign_out_timeout(mut self, timeout: Duration) -> Self {
        self.sign_out_timeout_ms = duration_ms(timeout);
        self
    }

    /// Reject values that would silently disable or break the guard
    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("idle_timeout_ms", self.idle_timeout_ms),
            ("check_interval_ms", self.check_interval_ms),
            ("session_check_interval_ms", self.session_check_interval_ms),
            ("sign_out_timeout_ms", self.sign_out_timeout_ms),
        ];
        for (field, value) in durations {
            if value == 0 {
                return Err(ConfigError::ZeroDuration { field });
            }
        }

        if self.warning_enabled {
            if self.countdown_ms == 0 {
                return Err(ConfigError::ZeroDuration {
                    field: "countdown_ms",
                });
            }
            if self.countdown_ms >= self.idle_timeout_ms {
                return Err(ConfigError::CountdownTooLong {
                    countdown_ms: self.countdown_ms,
                    idle_timeout_ms: self.idle_timeout_ms,
                });
            }
        }

        if !self.login_path.starts_with('/') {
            return Err(ConfigError::InvalidLoginPath(self.login_path.clone()));
        }

        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    /// Countdown length, or `None` when the warning phase is disabled
    pub fn countdown(&self) -> Option<Duration> {
        self.warning_enabled
            .then(|| Duration::from_millis(self.countdown_ms))
    }

    /// Idle time after which the warning (or the logout, if single-phase) starts
    pub fn warn_after(&self) -> Duration {
        match self.countdown() {
            Some(countdown) => self.idle_timeout().saturating_sub(countdown),
            None => self.idle_timeout(),
        }
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn session_check_interval(&self) -> Duration {
        Duration::from_millis(self.session_check_interval_ms)
    }

    pub fn sign_out_timeout(&self) -> Duration {
        Duration::from_millis(self.sign_out_timeout_ms)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
