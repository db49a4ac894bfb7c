// ── Resource fetchers ──
//
// One module per resource. Every fetcher ensures the target's session, picks
// the API family from the target's auth mode, and returns a `ResultEnvelope`
// of normalized entities.

mod alarms;
mod clients;
mod devices;
mod sites;
mod sysinfo;

use serde_json::Value;
use unimux_api::{ApiResponse, AuthStrategy, TargetClient};

use crate::error::CoreError;

pub use alarms::get_alarms;
pub use clients::get_clients;
pub use devices::get_devices;
pub use sites::{SitePage, list_sites, resolve_site_id};
pub use sysinfo::{SysinfoReport, get_sysinfo};

/// Options shared by every fetcher.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Site override; `None` or empty uses the target's default site.
    pub site: Option<String>,
    /// Attach the unprocessed backend payload to the envelope.
    pub raw: bool,
}

impl FetchOptions {
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn raw(mut self, raw: bool) -> Self {
        self.raw = raw;
        self
    }

    /// The effective site for `client`'s target.
    pub(crate) fn site_for<'a>(&'a self, client: &'a TargetClient) -> &'a str {
        client.target().site(self.site.as_deref())
    }
}

/// Backend payload family a fetch goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFamily {
    /// Cookie-session classic / site API.
    Classic,
    /// API-key integration API.
    Integration,
}

impl ApiFamily {
    pub fn for_client(client: &TargetClient) -> Self {
        match client.target().auth.strategy() {
            AuthStrategy::ApiKey => Self::Integration,
            AuthStrategy::Session => Self::Classic,
        }
    }
}

/// Succeed on 2xx, otherwise classify with the `HTTP {status}` fallback.
pub(crate) fn expect_success(resp: ApiResponse) -> Result<ApiResponse, CoreError> {
    Ok(resp.error_for_status()?)
}

/// The list inside a response body: `body.data` when it is an array, or the
/// body itself when the controller returned a bare array.
pub(crate) fn data_array(body: &Value) -> Option<&Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("data").and_then(Value::as_array),
        _ => None,
    }
}

/// `body.data` when present and non-null, else the whole body.
pub(crate) fn data_or_body(body: &Value) -> Value {
    body.get("data")
        .filter(|v| !v.is_null())
        .unwrap_or(body)
        .clone()
}
