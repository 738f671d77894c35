//! Session handle issued by the auth collaborator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only view of the externally issued session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    /// Absolute expiry, independent of activity
    #[serde(rename = "expires", alias = "expiresAt")]
    pub expires_at: DateTime<Utc>,

    /// Signed-in user
    #[serde(default)]
    pub user: SessionUser,
}

/// User attached to a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub image: Option<String>,
}

impl SessionHandle {
    pub fn new(expires_at: DateTime<Utc>) -> Self {
        Self {
            expires_at,
            user: SessionUser::default(),
        }
    }

    /// Attach the user's email
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.user.email = Some(email.into());
        self
    }

    /// Attach the user's display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.user.name = Some(name.into());
        self
    }

    /// Best label for logs: name, then email
    pub fn display_name(&self) -> &str {
        self.user
            .name
            .as_deref()
            .or(self.user.email.as_deref())
            .unwrap_or("unknown user")
    }
}
