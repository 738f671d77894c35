//! shevoices-core: idle-session timeout and auto-logout for SheVoices
//!
//! This crate keeps an authenticated scope from outliving its user:
//!
//! - **Activity tracking** - [`ActivityTracker`] records the last user interaction
//! - **Idle monitor** - [`IdleMonitor`] drives the Idle → Warning → LoggedOut machine
//! - **Session expiry** - [`SessionExpiryChecker`] compares the session's absolute expiry with now
//! - **Forced logout** - [`LogoutCoordinator`] signs out and redirects exactly once
//! - **Session guard** - [`SessionGuard`] owns all of the above for one authenticated mount
//! - **Auth collaborators** - [`auth`] session lookup, sign-out and navigation
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use shevoices_core::{GuardCollaborators, GuardConfig, HttpAuthClient, SessionGuard};
//! use shevoices_core::auth::RecordingNavigator;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(HttpAuthClient::new("https://shevoices.example")?);
//!     let collaborators =
//!         GuardCollaborators::new(client.clone(), client, Arc::new(RecordingNavigator::new()));
//!
//!     let guard = SessionGuard::start(GuardConfig::default(), collaborators).await?;
//!     guard.record_activity();
//!
//!     let reason = guard.wait_for_logout().await;
//!     println!("signed out: {reason:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── SessionGuard ─────────────────────────────┐
//! │                                                                       │
//! │  ActivityTracker ──▶ idle task (IdleMonitor) ──┐                      │
//! │                                                ├──▶ LogoutCoordinator │
//! │  SessionProvider ──▶ expiry task ──────────────┘     │                │
//! │                                                      ▼                │
//! │                                       SignOut / Navigator, IdleState  │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```

pub mod activity;
pub mod auth;
pub mod config;
pub mod error;
pub mod expiry;
pub mod guard;
pub mod logout;
pub mod monitor;
pub mod state;
pub mod warning;

// Re-export key types for convenience
pub use activity::{ActivityKind, ActivityTracker};
pub use auth::{
    AuthError, HttpAuthClient, Navigator, SessionHandle, SessionProvider, SessionUser, SignOut,
    SignOutOptions,
};
pub use config::GuardConfig;
pub use error::{ConfigError, GuardError};
pub use expiry::{ExpiryStatus, SessionExpiryChecker};
pub use guard::{GuardCollaborators, SessionGuard};
pub use logout::{LogoutCoordinator, redirect_target};
pub use monitor::{IdleMonitor, Transition};
pub use state::{GuardEvent, IdleState, LogoutReason};
pub use warning::WarningPrompt;
