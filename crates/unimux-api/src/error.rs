use thiserror::Error;

use crate::normalize::NormalizedError;

/// Top-level error type for the `unimux-api` crate.
///
/// A non-2xx response is *not* an error at the transport level -- the client
/// hands it back as an ordinary [`ApiResponse`](crate::ApiResponse). Callers
/// turn it into [`Error::Controller`] once their fallback logic is exhausted.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Login failed: {message}")]
    Authentication { message: String },

    /// API key cannot be represented as an HTTP header.
    #[error("Invalid API key header: {0}")]
    InvalidApiKeyHeader(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The target's per-request timeout elapsed.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u128 },

    /// TLS configuration error (unreadable or invalid CA bundle).
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller ──────────────────────────────────────────────────
    /// Non-2xx (or `meta.rc == "error"`) response, classified.
    #[error("{0}")]
    Controller(NormalizedError),

    // ── Data ────────────────────────────────────────────────────────
    /// Response body did not have the expected shape.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The normalized classification, when this error came from a response.
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Self::Controller(n) => Some(n),
            _ => None,
        }
    }

    /// Returns `true` if the request never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }
}
