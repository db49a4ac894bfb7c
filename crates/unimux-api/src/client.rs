// Per-target HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, rate limiting, CSRF replay
// and capture. Non-2xx responses come back as ordinary `ApiResponse`
// values so callers can apply endpoint-specific fallback logic. Login lives
// in `session.rs`.

use std::sync::Arc;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::cookie::CookieStore;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::limiter::RateLimiter;
use crate::normalize::normalize_error;
use crate::session::SessionState;
use crate::target::Target;
use crate::transport::TransportConfig;

/// Header carrying the anti-forgery token, in both directions.
pub const CSRF_HEADER: &str = "x-csrf-token";

// ── Request / response ───────────────────────────────────────────────

/// A request relative to the target's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path produced by the router, e.g. `/api/s/default/stat/device`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body. Non-JSON text is kept as a string, empty as `Null`.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Classify this response as an error, with `HTTP {status}` as the
    /// fallback message.
    pub fn to_error(&self) -> Error {
        let status = self.status.as_u16();
        Error::Controller(normalize_error(
            status,
            Some(&self.body),
            &format!("HTTP {status}"),
        ))
    }

    /// Succeed with `self` on 2xx, otherwise classify.
    pub fn error_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(self.to_error())
        }
    }

    /// Deserialize the body into a typed shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_value(self.body.clone()).map_err(|e| {
            let body = self.body.to_string();
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// HTTP client for one controller target.
///
/// Owns that target's cookie jar, CSRF token, login state, and rate limiter.
/// Constructed once per target and reused for the life of the process.
pub struct TargetClient {
    target: Arc<Target>,
    http: reqwest::Client,
    limiter: RateLimiter,
    pub(crate) session: SessionState,
}

impl TargetClient {
    /// Build the client from the target's own transport settings.
    pub fn new(target: Arc<Target>) -> Result<Self, Error> {
        let transport = TransportConfig::for_target(&target)?;
        let http = transport.build_client()?;
        let limiter = RateLimiter::new(target.rate_limit_per_sec);
        debug!(
            target = %target.id,
            flavor = %target.flavor,
            interval_ms = limiter.interval().as_millis(),
            "target client created"
        );
        Ok(Self {
            session: SessionState::new(transport.cookie_jar),
            target,
            http,
            limiter,
        })
    }

    pub fn target(&self) -> &Arc<Target> {
        &self.target
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// The `Cookie` header this client would send to the controller, if any.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.session.cookie_jar()?;
        let cookies = jar.cookies(&self.target.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    /// Join a router path onto the base URL, keeping any base path.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.target.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}/{}", path.trim_start_matches('/'));
        Ok(Url::parse(&full)?)
    }

    /// Execute one request through the target's limiter.
    ///
    /// Replays the stored CSRF token, captures a first token from the
    /// response, and returns the response regardless of status. Only
    /// transport failures (including the per-request timeout) are errors.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        let url = self.url(&request.path)?;
        let mut builder = self.http.request(request.method.clone(), url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.session.csrf_token() {
            if let Ok(mut value) = HeaderValue::from_str(token) {
                value.set_sensitive(true);
                builder = builder.header(CSRF_HEADER, value);
            }
        }

        self.limiter.acquire().await;
        debug!(target = %self.target.id, method = %request.method, path = %request.path, "dispatch");

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let headers = resp.headers().clone();
        if self.session.capture_csrf(&headers) {
            trace!(target = %self.target.id, "CSRF token captured");
        }

        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        let body = parse_body(&text);

        debug!(target = %self.target.id, path = %request.path, status = status.as_u16(), "response");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: self.target.timeout.as_millis(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}
