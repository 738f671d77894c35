//! Collaborator traits for the session guard
//!
//! The guard never talks to the auth service directly. A host injects a
//! [`SessionProvider`] to read the current session, a [`SignOut`] to end it,
//! and a [`Navigator`] for client-side redirects.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AuthError, SessionHandle};

/// Options passed to [`SignOut::sign_out`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOutOptions {
    /// Where the user lands after signing out
    pub callback_url: String,
    /// Whether the collaborator should perform the redirect itself
    pub redirect: bool,
}

/// Source of the current authenticated session
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, or `None` when unauthenticated
    async fn current_session(&self) -> Result<Option<SessionHandle>, AuthError>;
}

/// Terminates the authenticated session
#[async_trait]
pub trait SignOut: Send + Sync {
    async fn sign_out(&self, options: SignOutOptions) -> Result<(), AuthError>;
}

/// Performs client-side navigation
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}
