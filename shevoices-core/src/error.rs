//! Error types for shevoices-core

use thiserror::Error;

use crate::auth::AuthError;

/// Top-level error type for shevoices-core
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("No authenticated session to guard")]
    NotAuthenticated,
}

/// Errors from validating a [`GuardConfig`](crate::config::GuardConfig)
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("countdown_ms ({countdown_ms}) must be shorter than idle_timeout_ms ({idle_timeout_ms})")]
    CountdownTooLong {
        countdown_ms: u64,
        idle_timeout_ms: u64,
    },

    #[error("login_path must be an absolute path, got {0:?}")]
    InvalidLoginPath(String),
}
