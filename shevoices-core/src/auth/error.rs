//! Auth collaborator error types

use std::time::Duration;

use thiserror::Error;

/// Errors from the session / sign-out collaborator
#[derive(Debug, Error)]
pub enum AuthError {
    /// The HTTP request could not be completed
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The auth endpoint answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    /// The session payload could not be decoded
    #[error("invalid session payload: {0}")]
    InvalidSession(#[from] serde_json::Error),

    /// The CSRF endpoint did not return a token
    #[error("no CSRF token returned by the auth endpoint")]
    MissingCsrfToken,

    /// The configured base URL is not usable
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The collaborator refused the operation
    #[error("sign-out rejected: {0}")]
    Rejected(String),

    /// The sign-out call did not finish in time
    #[error("sign-out timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::MissingCsrfToken;
        assert_eq!(err.to_string(), "no CSRF token returned by the auth endpoint");
    }

    #[test]
    fn test_auth_error_unexpected_status() {
        let err = AuthError::UnexpectedStatus {
            endpoint: "/api/auth/session".to_string(),
            status: 502,
        };
        assert_eq!(err.to_string(), "/api/auth/session returned HTTP 502");
    }

    #[test]
    fn test_auth_error_timeout() {
        let err = AuthError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "sign-out timed out after 5s");
    }

    #[test]
    fn test_auth_error_from_url_parse() {
        let parse = url::Url::parse("not a url").unwrap_err();
        let err: AuthError = parse.into();
        assert!(matches!(err, AuthError::InvalidBaseUrl(_)));
    }
}
