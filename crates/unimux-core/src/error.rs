// ── Core error types ──
//
// Errors surfaced by fetchers and the registry. Transport-layer failures
// arrive wrapped from `unimux_api::Error` and keep their classification.

use thiserror::Error;

use unimux_api::NormalizedError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Registry errors ──────────────────────────────────────────────
    #[error("Unknown target: {id}")]
    UnknownTarget { id: String },

    #[error("targetId is required when {count} targets are configured")]
    TargetRequired { count: usize },

    #[error("No targets configured")]
    NoTargets,

    #[error("Duplicate target id: {id}")]
    DuplicateTarget { id: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Site '{name}' not found")]
    SiteNotFound { name: String },

    // ── API errors ───────────────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] unimux_api::Error),
}

impl CoreError {
    /// The normalized controller classification, when there is one.
    pub fn normalized(&self) -> Option<&NormalizedError> {
        match self {
            Self::Api(e) => e.normalized(),
            _ => None,
        }
    }
}
