//! Session guard: the session-aware scope
//!
//! A [`SessionGuard`] is created when an authenticated UI mounts and owns
//! everything the idle/expiry logic needs: the activity tracker, the idle
//! monitor, the logout coordinator and two periodic tasks (idle checks and
//! session-expiry checks). Dropping or stopping the guard cancels both tasks,
//! so no logout can fire against a torn-down scope.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::activity::{ActivityKind, ActivityTracker};
use crate::auth::{Navigator, SessionProvider, SignOut};
use crate::config::GuardConfig;
use crate::error::GuardError;
use crate::expiry::{ExpiryStatus, SessionExpiryChecker};
use crate::logout::{LogoutCoordinator, publish_state};
use crate::monitor::{IdleMonitor, Transition};
use crate::state::{GuardEvent, IdleState, LogoutReason};
use crate::warning::WarningPrompt;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// External collaborators a guard is mounted with
#[derive(Clone)]
pub struct GuardCollaborators {
    pub sessions: Arc<dyn SessionProvider>,
    pub sign_out: Arc<dyn SignOut>,
    pub navigator: Arc<dyn Navigator>,
}

impl GuardCollaborators {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        sign_out: Arc<dyn SignOut>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            sessions,
            sign_out,
            navigator,
        }
    }
}

/// State shared between the guard, its tasks and its warning prompts
pub(crate) struct GuardInner {
    pub(crate) scope_id: Uuid,
    pub(crate) tracker: Arc<ActivityTracker>,
    pub(crate) monitor: Mutex<IdleMonitor>,
    pub(crate) coordinator: Arc<LogoutCoordinator>,
    pub(crate) state_tx: Arc<watch::Sender<IdleState>>,
    pub(crate) event_tx: broadcast::Sender<GuardEvent>,
}

impl GuardInner {
    pub(crate) async fn stay_signed_in(&self) {
        if self.coordinator.has_fired() {
            return;
        }
        self.tracker.record_activity();
        // Publish under the lock so a tick cannot re-show the warning after us
        let mut monitor = self.monitor.lock().await;
        if monitor.dismiss() {
            info!(scope_id = %self.scope_id, "User chose to stay signed in");
            publish_state(&self.state_tx, IdleState::Idle);
            self.emit(GuardEvent::WarningDismissed);
        }
    }

    pub(crate) async fn force_logout(&self, reason: LogoutReason) -> bool {
        let performed = self.coordinator.force_logout(reason).await;
        if performed {
            self.monitor.lock().await.mark_logged_out();
        }
        performed
    }

    fn emit(&self, event: GuardEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Owns the idle and session-expiry timers for one authenticated mount
pub struct SessionGuard {
    inner: Arc<GuardInner>,
    config: GuardConfig,
    state_rx: watch::Receiver<IdleState>,
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl SessionGuard {
    /// Mount a guard for the current session.
    ///
    /// Fails fast on invalid configuration, and with
    /// [`GuardError::NotAuthenticated`] when there is no session to guard.
    pub async fn start(
        config: GuardConfig,
        collaborators: GuardCollaborators,
    ) -> Result<Self, GuardError> {
        config.validate()?;

        let session = collaborators
            .sessions
            .current_session()
            .await?
            .ok_or(GuardError::NotAuthenticated)?;

        let scope_id = Uuid::new_v4();
        let shutdown = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(IdleState::Idle);
        let state_tx = Arc::new(state_tx);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let coordinator = Arc::new(LogoutCoordinator::new(
            config.login_path.clone(),
            config.sign_out_timeout(),
            shutdown.clone(),
            collaborators.sign_out,
            collaborators.navigator,
            Arc::clone(&state_tx),
            event_tx.clone(),
        ));

        let inner = Arc::new(GuardInner {
            scope_id,
            tracker: Arc::new(ActivityTracker::new()),
            monitor: Mutex::new(IdleMonitor::new(&config)),
            coordinator,
            state_tx,
            event_tx,
        });

        let handles = vec![
            tokio::spawn(run_idle_checks(
                Arc::clone(&inner),
                config.check_interval(),
                shutdown.clone(),
            )),
            tokio::spawn(run_expiry_checks(
                Arc::clone(&inner),
                collaborators.sessions,
                SessionExpiryChecker::new(),
                config.session_check_interval(),
                shutdown.clone(),
            )),
        ];

        info!(
            scope_id = %scope_id,
            user = %session.display_name(),
            expires_at = %session.expires_at,
            idle_timeout_ms = config.idle_timeout_ms,
            warning = config.warning_enabled,
            "Session guard started"
        );

        Ok(Self {
            inner,
            config,
            state_rx,
            shutdown,
            handles,
        })
    }

    pub fn scope_id(&self) -> Uuid {
        self.inner.scope_id
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Forward a user interaction
    pub fn on_activity(&self, kind: ActivityKind) {
        self.inner.tracker.record(kind);
    }

    pub fn record_activity(&self) {
        self.inner.tracker.record_activity();
    }

    /// Shared tracker, for hosts that wire input sources directly
    pub fn tracker(&self) -> Arc<ActivityTracker> {
        Arc::clone(&self.inner.tracker)
    }

    /// Record activity and cancel a running countdown immediately
    pub async fn stay_signed_in(&self) {
        self.inner.stay_signed_in().await;
    }

    /// Log out at the user's request
    pub async fn logout_now(&self) -> bool {
        self.inner.force_logout(LogoutReason::Manual).await
    }

    /// Force a logout for `reason`; `false` if one already happened
    pub async fn force_logout(&self, reason: LogoutReason) -> bool {
        self.inner.force_logout(reason).await
    }

    pub fn state(&self) -> IdleState {
        self.state_rx.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<IdleState> {
        self.state_rx.clone()
    }

    /// Subscribe to guard events
    pub fn subscribe(&self) -> broadcast::Receiver<GuardEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Handle for a warning dialog bound to this guard
    pub fn warning_prompt(&self) -> WarningPrompt {
        WarningPrompt::new(Arc::clone(&self.inner), self.state_rx.clone())
    }

    /// Whether the timers are still running
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled()
    }

    /// Wait until the guard reaches `LoggedOut`
    pub async fn wait_for_logout(&self) -> Option<LogoutReason> {
        let mut rx = self.state_rx.clone();
        let reason = rx
            .wait_for(IdleState::is_logged_out)
            .await
            .ok()
            .and_then(|state| match &*state {
                IdleState::LoggedOut { reason } => Some(*reason),
                _ => None,
            });
        reason
    }

    /// Tear the guard down: cancel both timers and wait for them to exit
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        for handle in std::mem::take(&mut self.handles) {
            if let Err(e) = handle.await {
                warn!(scope_id = %self.inner.scope_id, error = %e, "Guard task failed");
            }
        }
        if !self.inner.coordinator.has_fired() {
            self.inner.emit(GuardEvent::Stopped);
        }
        info!(scope_id = %self.inner.scope_id, "Session guard stopped");
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.shutdown.is_cancelled() {
            self.shutdown.cancel();
            debug!(scope_id = %self.inner.scope_id, "Session guard dropped, timers cancelled");
        }
    }
}

/// Hand the logout to its own task so the timer task can exit right away
fn spawn_logout(inner: &Arc<GuardInner>, reason: LogoutReason) {
    let inner = Arc::clone(inner);
    tokio::spawn(async move {
        inner.force_logout(reason).await;
    });
}

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn run_idle_checks(inner: Arc<GuardInner>, period: Duration, shutdown: CancellationToken) {
    let mut ticker = ticker(period);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        // Held until the resulting state is published, so `stay_signed_in`
        // cannot interleave between evaluation and publication
        let mut monitor = inner.monitor.lock().await;
        let transition = monitor.evaluate(Instant::now(), inner.tracker.last_activity_at());

        match transition {
            Transition::None => {}
            Transition::WarningStarted { remaining_secs } => {
                info!(scope_id = %inner.scope_id, remaining_secs, "Idle warning started");
                publish_state(&inner.state_tx, IdleState::Warning { remaining_secs });
                inner.emit(GuardEvent::WarningStarted { remaining_secs });
            }
            Transition::Countdown { remaining_secs } => {
                trace!(scope_id = %inner.scope_id, remaining_secs, "Countdown");
                publish_state(&inner.state_tx, IdleState::Warning { remaining_secs });
                inner.emit(GuardEvent::Countdown { remaining_secs });
            }
            Transition::WarningDismissed => {
                debug!(scope_id = %inner.scope_id, "Activity cancelled idle warning");
                publish_state(&inner.state_tx, IdleState::Idle);
                inner.emit(GuardEvent::WarningDismissed);
            }
            Transition::Expired => {
                drop(monitor);
                if !shutdown.is_cancelled() {
                    info!(scope_id = %inner.scope_id, "Idle timeout reached");
                    spawn_logout(&inner, LogoutReason::Inactivity);
                }
                break;
            }
        }
    }

    debug!(scope_id = %inner.scope_id, "Idle checks stopped");
}

async fn run_expiry_checks(
    inner: Arc<GuardInner>,
    sessions: Arc<dyn SessionProvider>,
    checker: SessionExpiryChecker,
    period: Duration,
    shutdown: CancellationToken,
) {
    let mut ticker = ticker(period);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let lookup = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            lookup = sessions.current_session() => lookup,
        };

        let status = match lookup {
            Ok(session) => checker.check(session.as_ref()),
            Err(e) => {
                warn!(scope_id = %inner.scope_id, error = %e, "Session lookup failed");
                continue;
            }
        };

        if let ExpiryStatus::Valid { remaining } = status {
            trace!(scope_id = %inner.scope_id, remaining_secs = remaining.as_secs(), "Session valid");
        }
        if status.requires_logout() {
            if !shutdown.is_cancelled() {
                info!(scope_id = %inner.scope_id, status = ?status, "Session no longer valid");
                spawn_logout(&inner, LogoutReason::SessionExpired);
            }
            break;
        }
    }

    debug!(scope_id = %inner.scope_id, "Session expiry checks stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{RecordingNavigator, RecordingSignOut, SessionHandle, StaticSessionProvider};
    use chrono::Utc;

    fn collaborators(provider: StaticSessionProvider) -> (GuardCollaborators, Arc<RecordingSignOut>) {
        let sign_out = Arc::new(RecordingSignOut::new());
        let collaborators = GuardCollaborators::new(
            Arc::new(provider),
            sign_out.clone(),
            Arc::new(RecordingNavigator::new()),
        );
        (collaborators, sign_out)
    }

    fn long_session() -> StaticSessionProvider {
        StaticSessionProvider::new(SessionHandle::new(Utc::now() + chrono::Duration::hours(1)))
    }

    #[tokio::test(start_paused = true)]
    async fn start_rejects_invalid_config() {
        let (collaborators, _) = collaborators(long_session());
        let config = GuardConfig::default().with_check_interval(Duration::ZERO);
        let result = SessionGuard::start(config, collaborators).await;
        assert!(matches!(result, Err(GuardError::Config(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn start_requires_a_session() {
        let (collaborators, _) = collaborators(StaticSessionProvider::signed_out());
        let result = SessionGuard::start(GuardConfig::default(), collaborators).await;
        assert!(matches!(result, Err(GuardError::NotAuthenticated)));
    }

    #[tokio::test(start_paused = true)]
    async fn new_guard_is_idle_and_running() {
        let (collaborators, _) = collaborators(long_session());
        let guard = SessionGuard::start(GuardConfig::default(), collaborators)
            .await
            .unwrap();
        assert_eq!(guard.state(), IdleState::Idle);
        assert!(guard.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_timers_and_emits_stopped() {
        let (collaborators, sign_out) = collaborators(long_session());
        let guard = SessionGuard::start(GuardConfig::default(), collaborators)
            .await
            .unwrap();
        let mut events = guard.subscribe();

        guard.stop().await;
        assert_eq!(events.recv().await.unwrap(), GuardEvent::Stopped);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(sign_out.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_now_uses_manual_reason() {
        let (collaborators, sign_out) = collaborators(long_session());
        let guard = SessionGuard::start(GuardConfig::default(), collaborators)
            .await
            .unwrap();

        assert!(guard.logout_now().await);
        assert!(!guard.is_running());
        assert_eq!(guard.wait_for_logout().await, Some(LogoutReason::Manual));
        assert_eq!(
            sign_out.calls()[0].callback_url,
            "/login?message=You%20have%20been%20signed%20out"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn revoked_session_logs_out() {
        let provider = Arc::new(long_session());
        let sign_out = Arc::new(RecordingSignOut::new());
        let collaborators = GuardCollaborators::new(
            provider.clone(),
            sign_out.clone(),
            Arc::new(RecordingNavigator::new()),
        );
        let guard = SessionGuard::start(GuardConfig::default(), collaborators)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert!(guard.is_running());

        provider.clear();
        assert_eq!(
            guard.wait_for_logout().await,
            Some(LogoutReason::SessionExpired)
        );
        assert_eq!(sign_out.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_the_warning_countdown() {
        let (collaborators, _) = collaborators(long_session());
        let config = GuardConfig::two_phase(Duration::from_secs(3), Duration::from_secs(2));
        let guard = SessionGuard::start(config, collaborators).await.unwrap();
        let mut events = guard.subscribe();

        assert_eq!(
            events.recv().await.unwrap(),
            GuardEvent::WarningStarted { remaining_secs: 2 }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            GuardEvent::Countdown { remaining_secs: 1 }
        );
        assert_eq!(
            events.recv().await.unwrap(),
            GuardEvent::LogoutStarted {
                reason: LogoutReason::Inactivity
            }
        );
        assert!(matches!(
            events.recv().await.unwrap(),
            GuardEvent::LoggedOut {
                reason: LogoutReason::Inactivity,
                ..
            }
        ));
    }
}
