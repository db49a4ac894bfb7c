// ── Result envelope ──
//
// Uniform return shape of every fetcher: `{ data, truncated?, raw? }`.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEnvelope<T> {
    pub data: T,
    /// The controller reported more results than it returned.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    /// Unprocessed backend payload, only when the caller asked for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl<T> ResultEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            truncated: false,
            raw: None,
        }
    }

    #[must_use]
    pub fn truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Attach `raw()` when `wanted`; the closure is not evaluated otherwise.
    #[must_use]
    pub fn with_raw(mut self, wanted: bool, raw: impl FnOnce() -> Value) -> Self {
        if wanted {
            self.raw = Some(raw());
        }
        self
    }
}
