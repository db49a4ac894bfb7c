// ── Target descriptor ──
//
// Immutable description of one controller endpoint. Built once at startup
// from validated configuration and shared behind an `Arc` thereafter.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::auth::{ControllerFlavor, TargetAuth};

/// A single configured controller.
#[derive(Debug, Clone)]
pub struct Target {
    /// Unique identifier within the registry.
    pub id: String,
    /// Controller root (e.g. `https://192.168.1.1` or `https://controller:8443`).
    pub base_url: Url,
    pub flavor: ControllerFlavor,
    /// Site used when a call does not name one.
    pub default_site: String,
    pub auth: TargetAuth,
    pub verify_ssl: bool,
    /// Extra PEM root certificate trusted for this target only.
    pub ca_bundle: Option<PathBuf>,
    pub timeout: Duration,
    pub rate_limit_per_sec: f64,
}

impl Target {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);
    pub const DEFAULT_RATE_LIMIT: f64 = 5.0;

    /// A target with default transport settings (TLS verified, 15s timeout, 5 req/s).
    pub fn new(
        id: impl Into<String>,
        base_url: Url,
        flavor: ControllerFlavor,
        default_site: impl Into<String>,
        auth: TargetAuth,
    ) -> Self {
        Self {
            id: id.into(),
            base_url,
            flavor,
            default_site: default_site.into(),
            auth,
            verify_ssl: true,
            ca_bundle: None,
            timeout: Self::DEFAULT_TIMEOUT,
            rate_limit_per_sec: Self::DEFAULT_RATE_LIMIT,
        }
    }

    pub fn with_rate_limit(mut self, per_sec: f64) -> Self {
        self.rate_limit_per_sec = per_sec;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    pub fn with_ca_bundle(mut self, path: PathBuf) -> Self {
        self.ca_bundle = Some(path);
        self
    }

    pub fn uses_api_key(&self) -> bool {
        self.auth.is_api_key()
    }

    /// Resolve an optional site override against the default site.
    pub fn site<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.default_site)
    }
}
