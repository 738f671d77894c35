//! User activity tracking
//!
//! [`ActivityTracker`] keeps the instant of the most recent user interaction.
//! It is written from input handlers at high frequency (pointer moves,
//! scrolling), so recording is a single atomic operation with no locking,
//! allocation or I/O.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::trace;

/// Interaction classes a host forwards to the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PointerDown,
    PointerMove,
    KeyPress,
    Scroll,
    TouchStart,
    Click,
}

impl ActivityKind {
    /// Every interaction class that resets the idle clock
    pub const ALL: [ActivityKind; 6] = [
        ActivityKind::PointerDown,
        ActivityKind::PointerMove,
        ActivityKind::KeyPress,
        ActivityKind::Scroll,
        ActivityKind::TouchStart,
        ActivityKind::Click,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PointerDown => "pointer_down",
            Self::PointerMove => "pointer_move",
            Self::KeyPress => "key_press",
            Self::Scroll => "scroll",
            Self::TouchStart => "touch_start",
            Self::Click => "click",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the most recent user activity on the monotonic clock.
///
/// The timestamp is stored as milliseconds since the tracker was created.
/// Updates use `fetch_max`, so concurrent writers never move it backwards.
#[derive(Debug)]
pub struct ActivityTracker {
    origin: Instant,
    last_activity_ms: AtomicU64,
}

impl ActivityTracker {
    /// Create a tracker whose last activity is "now"
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
        }
    }

    /// Record an interaction of the given kind
    pub fn record(&self, kind: ActivityKind) {
        trace!(kind = %kind, "Activity");
        self.record_activity();
    }

    /// Mark the user as active now
    pub fn record_activity(&self) {
        let elapsed = self.origin.elapsed().as_millis();
        let elapsed = u64::try_from(elapsed).unwrap_or(u64::MAX);
        self.last_activity_ms.fetch_max(elapsed, Ordering::AcqRel);
    }

    /// Instant of the most recent recorded activity
    pub fn last_activity_at(&self) -> Instant {
        let offset = self.last_activity_ms.load(Ordering::Acquire);
        self.origin + Duration::from_millis(offset)
    }

    /// Time elapsed since the most recent activity
    pub fn time_since_last_activity(&self) -> Duration {
        Instant::now().saturating_duration_since(self.last_activity_at())
    }
}

impl Default for ActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}
