// ── Error normalization ──
//
// Classifies an HTTP status plus response body into one stable error code.
// The classic API reports operation results in `meta.rc` / `meta.msg`, so
// those are lifted out of the body when present.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Stable error classification. Every (status, body) pair maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    Unauthorized,
    Forbidden,
    NotFound,
    Timeout,
    ControllerError,
    NetworkError,
}

impl ErrorCode {
    /// Priority order: 401, 403, 404, 408, >=500, then `meta.rc == "error"`.
    pub fn classify(status: u16, meta_rc: Option<&str>) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            408 => Self::Timeout,
            s if s >= 500 => Self::ControllerError,
            _ if meta_rc == Some("error") => Self::ControllerError,
            _ => Self::NetworkError,
        }
    }
}

/// A classified controller error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedError {
    pub code: ErrorCode,
    pub http_status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_rc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_msg: Option<String>,
    /// The backend message when present, else the caller's fallback.
    pub message: String,
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}, HTTP {}]",
            self.message, self.code, self.http_status
        )
    }
}

/// Normalize a status and optional body into a [`NormalizedError`].
///
/// Non-object bodies and bodies without `meta` contribute nothing; `rc` and
/// `msg` are only taken when they are strings.
pub fn normalize_error(status: u16, body: Option<&Value>, fallback: &str) -> NormalizedError {
    let meta = body.and_then(|b| b.as_object()).and_then(|o| o.get("meta"));
    let meta_str = |key: &str| {
        meta.and_then(|m| m.get(key))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };
    let meta_rc = meta_str("rc");
    let meta_msg = meta_str("msg");

    let message = meta_msg
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(fallback)
        .to_owned();

    NormalizedError {
        code: ErrorCode::classify(status, meta_rc.as_deref()),
        http_status: status,
        meta_rc,
        meta_msg,
        message,
    }
}
