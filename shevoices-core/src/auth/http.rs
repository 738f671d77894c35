//! HTTP client for the site's session endpoints

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{AuthError, Navigator, SessionHandle, SessionProvider, SignOut, SignOutOptions};

const SESSION_PATH: &str = "/api/auth/session";
const CSRF_PATH: &str = "/api/auth/csrf";
const SIGN_OUT_PATH: &str = "/api/auth/signout";

/// Per-request limit for calls to the auth routes
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Talks to the site's auth routes over HTTP.
///
/// Cookies set by the server (CSRF and session) are kept in a per-client jar,
/// optionally seeded with an existing session cookie.
pub struct HttpAuthClient {
    base_url: Url,
    http_client: reqwest::Client,
    navigator: Option<Arc<dyn Navigator>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsrfResponse {
    csrf_token: Option<String>,
}

impl HttpAuthClient {
    /// Create a client for the site at `base_url`
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        Self::with_session_cookie(base_url, None)
    }

    /// Create a client that presents an existing session cookie
    /// (`name=value` form)
    pub fn with_session_cookie(base_url: &str, cookie: Option<&str>) -> Result<Self, AuthError> {
        let base_url = Url::parse(base_url)?;
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = cookie {
            jar.add_cookie_str(cookie, &base_url);
        }
        let http_client = reqwest::Client::builder()
            .cookie_provider(jar)
            .timeout(HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url,
            http_client,
            navigator: None,
        })
    }

    /// Navigator used when a sign-out asks the collaborator to redirect
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        Ok(self.base_url.join(path)?)
    }

    async fn fetch_csrf_token(&self) -> Result<String, AuthError> {
        let response = self.http_client.get(self.endpoint(CSRF_PATH)?).send().await?;
        check_status(&response, CSRF_PATH)?;
        let body: CsrfResponse = response.json().await?;
        body.csrf_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCsrfToken)
    }
}

#[async_trait]
impl SessionProvider for HttpAuthClient {
    async fn current_session(&self) -> Result<Option<SessionHandle>, AuthError> {
        let response = self
            .http_client
            .get(self.endpoint(SESSION_PATH)?)
            .send()
            .await?;
        check_status(&response, SESSION_PATH)?;
        let body = response.text().await?;
        parse_session_body(&body)
    }
}

#[async_trait]
impl SignOut for HttpAuthClient {
    async fn sign_out(&self, options: SignOutOptions) -> Result<(), AuthError> {
        let csrf_token = self.fetch_csrf_token().await?;

        let form = [
            ("csrfToken", csrf_token.as_str()),
            ("callbackUrl", options.callback_url.as_str()),
            ("json", "true"),
        ];
        let response = self
            .http_client
            .post(self.endpoint(SIGN_OUT_PATH)?)
            .form(&form)
            .send()
            .await?;
        check_status(&response, SIGN_OUT_PATH)?;
        debug!(callback = %options.callback_url, "Signed out");

        if options.redirect {
            match &self.navigator {
                Some(navigator) => navigator.navigate(&options.callback_url),
                None => warn!("Sign-out requested a redirect but no navigator is configured"),
            }
        }
        Ok(())
    }
}

fn check_status(response: &reqwest::Response, endpoint: &str) -> Result<(), AuthError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(AuthError::UnexpectedStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

/// Decode a session endpoint body; `{}`, `null` and empty mean signed out
fn parse_session_body(body: &str) -> Result<Option<SessionHandle>, AuthError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(body)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(ref map) if map.is_empty() => Ok(None),
        other => Ok(Some(serde_json::from_value(other)?)),
    }
}
