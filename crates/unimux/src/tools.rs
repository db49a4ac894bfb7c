// ── Tool arguments and payloads ──
//
// Argument structs are deserialized from MCP tool calls and double as the
// tools' input schemas. Field names follow the camelCase the tool schemas
// publish (`targetId`, `activeOnly`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use unimux_core::{FetchOptions, SitePage};

/// Target id used in payloads of tools that span every target.
pub const GLOBAL_TARGET: &str = "global";

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListSitesArgs {
    /// Target id; optional when exactly one target is configured
    pub target_id: Option<String>,
    /// Include the unprocessed controller payload
    pub raw: Option<bool>,
    /// Page offset (API-key targets only)
    pub offset: Option<u64>,
    /// Page size (API-key targets only)
    pub limit: Option<u64>,
    /// Server-side filter expression (API-key targets only)
    pub filter: Option<String>,
}

impl ListSitesArgs {
    pub fn page(&self) -> SitePage {
        SitePage {
            offset: self.offset,
            limit: self.limit,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteArgs {
    /// Target id; optional when exactly one target is configured
    pub target_id: Option<String>,
    /// Site name or id; defaults to the target's default site
    pub site: Option<String>,
    /// Include the unprocessed controller payload
    pub raw: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DevicesArgs {
    #[serde(flatten)]
    pub common: SiteArgs,
    /// Only return devices with these MAC addresses
    pub macs: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientsArgs {
    #[serde(flatten)]
    pub common: SiteArgs,
    /// Only return currently associated clients
    pub active_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlarmsArgs {
    #[serde(flatten)]
    pub common: SiteArgs,
    /// Also fetch alarms with this archived state and merge them in
    pub archived: Option<bool>,
}

/// Common fetch options from the per-call `site` and `raw` fields.
pub fn fetch_options(site: Option<&str>, raw: Option<bool>) -> FetchOptions {
    let opts = FetchOptions::default().raw(raw.unwrap_or(false));
    match site.filter(|s| !s.is_empty()) {
        Some(site) => opts.site(site),
        None => opts,
    }
}

impl SiteArgs {
    pub fn options(&self) -> FetchOptions {
        fetch_options(self.site.as_deref(), self.raw)
    }
}

// ── Payloads ─────────────────────────────────────────────────────────

/// `{ tool, targetId, result }`
pub fn success_payload(tool: &str, target_id: &str, result: impl Serialize) -> Value {
    let result = serde_json::to_value(result).unwrap_or_else(|e| Value::String(e.to_string()));
    json!({ "tool": tool, "targetId": target_id, "result": result })
}

/// `{ tool, targetId, error }`
pub fn error_payload(tool: &str, target_id: &str, error: &str) -> Value {
    json!({ "tool": tool, "targetId": target_id, "error": error })
}
