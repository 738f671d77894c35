//! Forced logout coordination
//!
//! Idle timeout, session expiry and the manual "log out now" action all end
//! up in [`LogoutCoordinator::force_logout`]. The first caller wins; every
//! other call, concurrent or later, is a no-op. That keeps the invariant of a
//! single sign-out call and a single redirect per guard.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::{AuthError, Navigator, SignOut, SignOutOptions};
use crate::state::{GuardEvent, IdleState, LogoutReason};

/// Build the login redirect target for a logout reason
///
/// ```
/// use shevoices_core::{LogoutReason, redirect_target};
///
/// assert_eq!(
///     redirect_target("/login", LogoutReason::Inactivity),
///     "/login?message=Session%20expired%20due%20to%20inactivity"
/// );
/// ```
pub fn redirect_target(login_path: &str, reason: LogoutReason) -> String {
    format!(
        "{}?message={}",
        login_path,
        urlencoding::encode(reason.message())
    )
}

/// Publish a state unless the guard already logged out
pub(crate) fn publish_state(state_tx: &watch::Sender<IdleState>, state: IdleState) -> bool {
    state_tx.send_if_modified(|current| {
        if current.is_logged_out() || *current == state {
            return false;
        }
        *current = state;
        true
    })
}

/// Single chokepoint for forced sign-out
pub struct LogoutCoordinator {
    fired: AtomicBool,
    login_path: String,
    sign_out_timeout: Duration,
    shutdown: CancellationToken,
    sign_out: Arc<dyn SignOut>,
    navigator: Arc<dyn Navigator>,
    state_tx: Arc<watch::Sender<IdleState>>,
    event_tx: broadcast::Sender<GuardEvent>,
}

impl LogoutCoordinator {
    pub fn new(
        login_path: impl Into<String>,
        sign_out_timeout: Duration,
        shutdown: CancellationToken,
        sign_out: Arc<dyn SignOut>,
        navigator: Arc<dyn Navigator>,
        state_tx: Arc<watch::Sender<IdleState>>,
        event_tx: broadcast::Sender<GuardEvent>,
    ) -> Self {
        Self {
            fired: AtomicBool::new(false),
            login_path: login_path.into(),
            sign_out_timeout,
            shutdown,
            sign_out,
            navigator,
            state_tx,
            event_tx,
        }
    }

    /// Whether a forced logout has already been started
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Force a logout. Returns `true` only for the call that performed it.
    ///
    /// Cancels the guard's timers, asks the collaborator to sign out with a
    /// redirect to the login page, and moves the state to `LoggedOut`. If the
    /// sign-out call fails or outlives `sign_out_timeout` the redirect is done
    /// locally instead; the failure is logged and not retried.
    pub async fn force_logout(&self, reason: LogoutReason) -> bool {
        if self.shutdown.is_cancelled() && !self.has_fired() {
            debug!(reason = %reason, "Guard already torn down, ignoring logout");
            return false;
        }
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(reason = %reason, "Logout already in flight");
            return false;
        }

        info!(reason = %reason, "Forcing logout");
        self.emit(GuardEvent::LogoutStarted { reason });
        self.shutdown.cancel();

        let target = redirect_target(&self.login_path, reason);
        let options = SignOutOptions {
            callback_url: target.clone(),
            redirect: true,
        };

        let result = tokio::time::timeout(self.sign_out_timeout, self.sign_out.sign_out(options))
            .await
            .unwrap_or(Err(AuthError::Timeout(self.sign_out_timeout)));

        if let Err(e) = result {
            warn!(error = %e, target = %target, "Sign-out failed, redirecting locally");
            self.emit(GuardEvent::SignOutFailed {
                error: e.to_string(),
            });
            self.navigator.navigate(&target);
        }

        publish_state(&self.state_tx, IdleState::LoggedOut { reason });
        self.emit(GuardEvent::LoggedOut {
            reason,
            redirect: target,
        });
        true
    }

    fn emit(&self, event: GuardEvent) {
        let _ = self.event_tx.send(event);
    }
}
