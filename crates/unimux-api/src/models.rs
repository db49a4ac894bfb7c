// Backend response shapes
//
// Two payload families reach the fetch layer:
//   classic / site API   { "meta": { "rc", "msg", "count"? }, "data": [...] }
//   integration API      { "offset", "limit", "count", "totalCount", "data": [...] }
// Fields use `#[serde(default)]` liberally because field presence varies
// across firmware versions. Numeric counters are parsed leniently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// ── Envelopes ────────────────────────────────────────────────────────

/// Metadata from the classic envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub rc: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    /// Present when the controller capped the list.
    #[serde(default)]
    pub count: Option<Value>,
}

impl Meta {
    /// `count` holds a truthy value (non-zero number, non-empty string, `true`).
    pub fn signals_truncation(&self) -> bool {
        match &self.count {
            Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(Value::Array(_) | Value::Object(_)) => true,
            Some(Value::Null) | None => false,
        }
    }
}

/// Classic (site API / controller API) list envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct LegacyEnvelope<T> {
    #[serde(default)]
    pub meta: Meta,
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
}

impl<T> LegacyEnvelope<T> {
    pub fn truncated(&self) -> bool {
        self.meta.signals_truncation()
    }
}

/// Integration API page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub offset: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_count: Option<u64>,
}

impl<T> Page<T> {
    /// The controller reports more items than it returned.
    pub fn truncated(&self) -> bool {
        self.total_count
            .is_some_and(|total| total > u64::try_from(self.data.len()).unwrap_or(u64::MAX))
    }
}

// ── Sites ────────────────────────────────────────────────────────────

/// Site from `/api/self/sites`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacySite {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "_id")]
    pub mongo_id: Option<String>,
    /// Internal short name (e.g. `default`), used in `/api/s/{name}/` paths.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "internalReference")]
    pub internal_reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Site from `/integration/v1/sites`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSite {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "_id")]
    pub mongo_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default, alias = "display_name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub internal_reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Device from `stat/device`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyDevice {
    #[serde(default)]
    pub mac: String,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub adopted_name: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub adopted: Option<bool>,
    /// 0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning
    #[serde(default, deserialize_with = "lenient_i64")]
    pub state: Option<i64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub uptime: Option<u64>,
    #[serde(default)]
    pub site_id: Option<String>,
}

/// Device from `/integration/v1/sites/{id}/devices`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationDevice {
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// e.g. `ONLINE`, `OFFLINE`, `PENDING_ADOPTION`.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub adopted: Option<bool>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub uptime: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub features: Vec<String>,
}

// ── Clients ──────────────────────────────────────────────────────────

/// Known client from `rest/user`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyKnownUser {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_ip: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
}

/// Active station from `stat/sta`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyStation {
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub ap_mac: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rx_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tx_bytes: Option<u64>,
    #[serde(default)]
    pub site_id: Option<String>,
}

/// Client from `/integration/v1/sites/{id}/clients`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationClientEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, rename = "user_id")]
    pub user_id: Option<String>,
    /// Presence (any non-null value) marks the client as connected.
    #[serde(default)]
    pub connected_at: Option<Value>,
    #[serde(default)]
    pub uplink_device_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub rx_bytes: Option<u64>,
    #[serde(default, rename = "rx_bytes", deserialize_with = "lenient_u64")]
    pub rx_bytes_legacy: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub tx_bytes: Option<u64>,
    #[serde(default, rename = "tx_bytes", deserialize_with = "lenient_u64")]
    pub tx_bytes_legacy: Option<u64>,
}

// ── Alarms ───────────────────────────────────────────────────────────

/// Alarm from `stat/alarm` or `rest/alarm`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyAlarm {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub time: Option<i64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub site_id: Option<String>,
}

impl LegacyAlarm {
    /// Merge key: `_id`, else `{time}-{key}`.
    pub fn merge_key(&self) -> String {
        match self.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_owned(),
            _ => format!(
                "{}-{}",
                self.time.map(|t| t.to_string()).unwrap_or_default(),
                self.key.as_deref().unwrap_or_default()
            ),
        }
    }
}

// ── Lenient parsing ──────────────────────────────────────────────────

/// A list field that may be absent or `null`; both read as empty.
fn null_as_empty<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(d)?.unwrap_or_default())
}

fn number_from(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(|v| match v {
        Value::Number(n) if n.is_u64() => n.as_u64(),
        other => number_from(other)
            .filter(|f| f.is_finite() && *f >= 0.0)
            .map(|f| f as u64),
    }))
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.as_ref().and_then(|v| match v {
        Value::Number(n) if n.is_i64() => n.as_i64(),
        other => number_from(other).filter(|f| f.is_finite()).map(|f| f as i64),
    }))
}
