//! Warning prompt handle
//!
//! A [`WarningPrompt`] is what a warning dialog binds to: it observes the
//! guard's state and exposes the two actions the dialog offers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::guard::GuardInner;
use crate::state::{IdleState, LogoutReason};

/// Dialog-facing view of a guard's countdown
pub struct WarningPrompt {
    inner: Arc<GuardInner>,
    state_rx: watch::Receiver<IdleState>,
}

impl WarningPrompt {
    pub(crate) fn new(inner: Arc<GuardInner>, state_rx: watch::Receiver<IdleState>) -> Self {
        Self { inner, state_rx }
    }

    /// Whether the dialog should be shown
    pub fn is_visible(&self) -> bool {
        self.state_rx.borrow().is_warning()
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.state_rx.borrow().remaining_secs()
    }

    pub fn state(&self) -> IdleState {
        self.state_rx.borrow().clone()
    }

    /// Countdown text for the dialog body
    pub fn message(&self) -> Option<String> {
        self.remaining_secs().map(countdown_message)
    }

    /// Wait for the next state change. `None` once the guard is gone.
    pub async fn changed(&mut self) -> Option<IdleState> {
        self.state_rx.changed().await.ok()?;
        Some(self.state_rx.borrow_and_update().clone())
    }

    /// "Stay signed in": record activity and close the dialog
    pub async fn stay_signed_in(&self) {
        self.inner.stay_signed_in().await;
    }

    /// "Log out now"
    pub async fn logout_now(&self) -> bool {
        self.inner.force_logout(LogoutReason::Manual).await
    }
}

pub(crate) fn countdown_message(remaining_secs: u64) -> String {
    let unit = if remaining_secs == 1 { "second" } else { "seconds" };
    format!("You will be signed out in {remaining_secs} {unit} due to inactivity.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{RecordingNavigator, RecordingSignOut, SessionHandle, StaticSessionProvider};
    use crate::config::GuardConfig;
    use crate::guard::{GuardCollaborators, SessionGuard};
    use chrono::Utc;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready};

    async fn guard() -> (SessionGuard, Arc<RecordingSignOut>) {
        let sign_out = Arc::new(RecordingSignOut::new());
        let collaborators = GuardCollaborators::new(
            Arc::new(StaticSessionProvider::new(SessionHandle::new(
                Utc::now() + chrono::Duration::hours(1),
            ))),
            sign_out.clone(),
            Arc::new(RecordingNavigator::new()),
        );
        let guard = SessionGuard::start(GuardConfig::default(), collaborators)
            .await
            .unwrap();
        (guard, sign_out)
    }

    #[test]
    fn countdown_message_pluralizes() {
        assert_eq!(
            countdown_message(10),
            "You will be signed out in 10 seconds due to inactivity."
        );
        assert_eq!(
            countdown_message(1),
            "You will be signed out in 1 second due to inactivity."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hidden_while_active() {
        let (guard, _) = guard().await;
        let prompt = guard.warning_prompt();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!prompt.is_visible());
        assert!(prompt.message().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn visible_with_countdown_after_warn_threshold() {
        let (guard, _) = guard().await;
        let prompt = guard.warning_prompt();

        tokio::time::sleep(Duration::from_millis(20_500)).await;
        assert!(prompt.is_visible());
        assert_eq!(prompt.remaining_secs(), Some(10));
        assert_eq!(
            prompt.message().as_deref(),
            Some("You will be signed out in 10 seconds due to inactivity.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stay_signed_in_closes_dialog_immediately() {
        let (guard, sign_out) = guard().await;
        let prompt = guard.warning_prompt();

        tokio::time::sleep(Duration::from_millis(25_500)).await;
        assert!(prompt.is_visible());

        prompt.stay_signed_in().await;
        assert!(!prompt.is_visible());
        assert_eq!(guard.state(), IdleState::Idle);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sign_out.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn logout_now_from_dialog_is_manual() {
        let (guard, sign_out) = guard().await;
        let prompt = guard.warning_prompt();

        tokio::time::sleep(Duration::from_millis(21_500)).await;
        assert!(prompt.logout_now().await);
        assert_eq!(
            prompt.state(),
            IdleState::LoggedOut {
                reason: LogoutReason::Manual
            }
        );
        assert_eq!(sign_out.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn changed_waits_for_next_state() {
        let (guard, _) = guard().await;
        let mut prompt = guard.warning_prompt();

        {
            let mut changed = tokio_test::task::spawn(prompt.changed());
            assert_pending!(changed.poll());
        }

        assert!(guard.logout_now().await);

        let mut changed = tokio_test::task::spawn(prompt.changed());
        let state = assert_ready!(changed.poll());
        assert_eq!(
            state,
            Some(IdleState::LoggedOut {
                reason: LogoutReason::Manual
            })
        );
    }
}
