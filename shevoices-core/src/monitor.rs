//! Idle monitor state machine
//!
//! The monitor is a plain value driven by a periodic tick: each call to
//! [`IdleMonitor::evaluate`] compares the current instant with the last
//! recorded activity and reports at most one [`Transition`]. Timing
//! precision is therefore bounded by the tick interval.
//!
//! ```text
//!            idle >= warn_after                 now >= deadline
//!   Idle ───────────────────────────▶ Warning ──────────────────▶ LoggedOut
//!    ▲                                   │
//!    └─────── activity before deadline ──┘
//! ```
//!
//! Without a warning phase, `Idle` goes straight to `LoggedOut` once the
//! idle budget is spent.

use std::time::Duration;

use tokio::time::Instant;

use crate::config::GuardConfig;

/// Result of one evaluation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed
    None,
    /// Entered the warning phase
    WarningStarted { remaining_secs: u64 },
    /// Still warning; remaining time for display
    Countdown { remaining_secs: u64 },
    /// Activity arrived before the deadline
    WarningDismissed,
    /// Idle budget spent; the caller must force a logout
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Warning {
        deadline: Instant,
        /// Last activity observed when the warning started
        seen_activity: Instant,
    },
    LoggedOut,
}

/// Idle/Warning/LoggedOut state machine
#[derive(Debug)]
pub struct IdleMonitor {
    warn_after: Duration,
    countdown: Option<Duration>,
    phase: Phase,
}

impl IdleMonitor {
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            warn_after: config.warn_after(),
            countdown: config.countdown(),
            phase: Phase::Idle,
        }
    }

    /// Re-evaluate the state at `now` given the latest activity instant
    pub fn evaluate(&mut self, now: Instant, last_activity: Instant) -> Transition {
        match self.phase {
            Phase::LoggedOut => Transition::None,
            Phase::Idle => {
                let idle = now.saturating_duration_since(last_activity);
                if idle < self.warn_after {
                    return Transition::None;
                }
                match self.countdown {
                    Some(countdown) => {
                        self.phase = Phase::Warning {
                            deadline: now + countdown,
                            seen_activity: last_activity,
                        };
                        Transition::WarningStarted {
                            remaining_secs: ceil_secs(countdown),
                        }
                    }
                    None => {
                        self.phase = Phase::LoggedOut;
                        Transition::Expired
                    }
                }
            }
            Phase::Warning {
                deadline,
                seen_activity,
            } => {
                if last_activity > seen_activity && last_activity < deadline {
                    self.phase = Phase::Idle;
                    return Transition::WarningDismissed;
                }
                if now >= deadline {
                    self.phase = Phase::LoggedOut;
                    return Transition::Expired;
                }
                Transition::Countdown {
                    remaining_secs: ceil_secs(deadline - now),
                }
            }
        }
    }

    /// Cancel a running countdown. Returns whether a warning was active.
    pub fn dismiss(&mut self) -> bool {
        if matches!(self.phase, Phase::Warning { .. }) {
            self.phase = Phase::Idle;
            true
        } else {
            false
        }
    }

    /// Move to the terminal state; later evaluations do nothing
    pub fn mark_logged_out(&mut self) {
        self.phase = Phase::LoggedOut;
    }

    pub fn is_warning(&self) -> bool {
        matches!(self.phase, Phase::Warning { .. })
    }

    pub fn is_logged_out(&self) -> bool {
        self.phase == Phase::LoggedOut
    }
}

/// Whole seconds, rounded up
fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn two_phase() -> IdleMonitor {
        IdleMonitor::new(&GuardConfig::two_phase(secs(20), secs(10)))
    }

    #[test]
    fn ceil_secs_rounds_up_partial_seconds() {
        assert_eq!(ceil_secs(Duration::from_millis(9_001)), 10);
        assert_eq!(ceil_secs(secs(9)), 9);
        assert_eq!(ceil_secs(Duration::from_millis(1)), 1);
        assert_eq!(ceil_secs(Duration::ZERO), 0);
    }

    #[test]
    fn stays_idle_below_threshold() {
        let mut monitor = two_phase();
        let start = Instant::now();
        assert_eq!(monitor.evaluate(start + secs(19), start), Transition::None);
        assert!(!monitor.is_warning());
    }

    #[test]
    fn enters_warning_at_threshold() {
        let mut monitor = two_phase();
        let start = Instant::now();
        assert_eq!(
            monitor.evaluate(start + secs(20), start),
            Transition::WarningStarted { remaining_secs: 10 }
        );
    }

    #[test]
    fn countdown_ticks_down_to_one_then_expires() {
        let mut monitor = two_phase();
        let start = Instant::now();
        monitor.evaluate(start + secs(20), start);

        let shown: Vec<u64> = (21..30)
            .map(|t| match monitor.evaluate(start + secs(t), start) {
                Transition::Countdown { remaining_secs } => remaining_secs,
                other => panic!("unexpected transition at {t}s: {other:?}"),
            })
            .collect();
        assert_eq!(shown, vec![9, 8, 7, 6, 5, 4, 3, 2, 1]);

        assert_eq!(
            monitor.evaluate(start + secs(30), start),
            Transition::Expired
        );
        assert!(monitor.is_logged_out());
    }

    #[test]
    fn activity_before_deadline_dismisses_warning() {
        let mut monitor = two_phase();
        let start = Instant::now();
        monitor.evaluate(start + secs(20), start);

        let activity = start + Duration::from_millis(25_500);
        assert_eq!(
            monitor.evaluate(start + secs(26), activity),
            Transition::WarningDismissed
        );
        assert!(!monitor.is_warning());

        // The idle clock restarts from the activity
        assert_eq!(monitor.evaluate(start + secs(45), activity), Transition::None);
        assert_eq!(
            monitor.evaluate(start + Duration::from_millis(45_500), activity),
            Transition::WarningStarted { remaining_secs: 10 }
        );
    }

    #[test]
    fn activity_after_deadline_does_not_rescue_session() {
        let mut monitor = two_phase();
        let start = Instant::now();
        monitor.evaluate(start + secs(20), start);

        let late = start + Duration::from_millis(30_200);
        assert_eq!(
            monitor.evaluate(start + Duration::from_millis(30_500), late),
            Transition::Expired
        );
    }

    #[test]
    fn dismiss_only_applies_in_warning() {
        let mut monitor = two_phase();
        let start = Instant::now();
        assert!(!monitor.dismiss());

        monitor.evaluate(start + secs(20), start);
        assert!(monitor.dismiss());
        assert!(!monitor.is_warning());
    }

    #[test]
    fn single_phase_expires_without_warning() {
        let mut monitor = IdleMonitor::new(&GuardConfig::single_phase(secs(30)));
        let start = Instant::now();
        assert_eq!(monitor.evaluate(start + secs(29), start), Transition::None);
        assert_eq!(
            monitor.evaluate(start + secs(30), start),
            Transition::Expired
        );
    }

    #[test]
    fn logged_out_is_terminal() {
        let mut monitor = two_phase();
        let start = Instant::now();
        monitor.mark_logged_out();
        assert_eq!(monitor.evaluate(start + secs(100), start), Transition::None);
        assert!(!monitor.dismiss());
    }
}
