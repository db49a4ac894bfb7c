// Session state and establishment
//
// A target's session is its cookie jar, the first CSRF token the controller
// hands out, and a one-shot "established" marker. Username/password targets
// log in lazily before their first fetch; API-key targets are established
// immediately because the key travels with every request.

use std::sync::{Arc, OnceLock};

use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use secrecy::ExposeSecret;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::auth::TargetAuth;
use crate::client::{ApiRequest, CSRF_HEADER, TargetClient};
use crate::error::Error;

/// Mutable per-target session. Lives as long as its client.
#[derive(Debug, Default)]
pub struct SessionState {
    cookie_jar: Option<Arc<Jar>>,
    /// First-write-wins: once captured, later tokens are ignored.
    csrf_token: OnceLock<String>,
    established: OnceCell<()>,
}

impl SessionState {
    pub fn new(cookie_jar: Option<Arc<Jar>>) -> Self {
        Self {
            cookie_jar,
            ..Self::default()
        }
    }

    pub fn cookie_jar(&self) -> Option<&Arc<Jar>> {
        self.cookie_jar.as_ref()
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.csrf_token.get().map(String::as_str)
    }

    /// Store the response's CSRF token if none is stored yet.
    /// Returns `true` when a token was newly captured.
    pub fn capture_csrf(&self, headers: &HeaderMap) -> bool {
        headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|t| !t.is_empty())
            .is_some_and(|token| self.csrf_token.set(token.to_owned()).is_ok())
    }

    pub fn is_logged_in(&self) -> bool {
        self.established.initialized()
    }
}

impl TargetClient {
    /// Establish the session once; a no-op when already established.
    ///
    /// Concurrent callers share a single login. A failed login leaves the
    /// session unestablished, so the next fetch tries again.
    pub async fn ensure_session(&self) -> Result<(), Error> {
        self.session
            .established
            .get_or_try_init(|| self.establish())
            .await
            .map(|_| ())
    }

    async fn establish(&self) -> Result<(), Error> {
        let target = self.target();
        match &target.auth {
            TargetAuth::ApiKey { .. } => {
                debug!(target = %target.id, "API key target; no login required");
                Ok(())
            }
            TargetAuth::Credentials { username, password } => {
                let path = target.flavor.login_path();
                debug!(target = %target.id, path, "logging in");

                let body = json!({
                    "username": username,
                    "password": password.expose_secret(),
                });
                let resp = self.send(ApiRequest::post(path, body)).await?;

                if !resp.is_success() {
                    return Err(Error::Authentication {
                        message: format!("HTTP {}", resp.status.as_u16()),
                    });
                }

                self.session.capture_csrf(&resp.headers);
                info!(target = %target.id, "session established");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn headers(token: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("x-csrf-token", HeaderValue::from_static(token));
        h
    }

    #[test]
    fn csrf_capture_is_first_write_wins() {
        let session = SessionState::default();
        assert!(session.csrf_token().is_none());

        assert!(session.capture_csrf(&headers("first")));
        assert!(!session.capture_csrf(&headers("second")));
        assert_eq!(session.csrf_token(), Some("first"));
    }

    #[test]
    fn responses_without_token_capture_nothing() {
        let session = SessionState::default();
        assert!(!session.capture_csrf(&HeaderMap::new()));
        assert!(!session.capture_csrf(&headers("")));
        assert!(session.csrf_token().is_none());
    }

    #[test]
    fn new_session_is_not_logged_in() {
        let session = SessionState::new(Some(Arc::new(Jar::default())));
        assert!(!session.is_logged_in());
        assert!(session.cookie_jar().is_some());
    }
}
