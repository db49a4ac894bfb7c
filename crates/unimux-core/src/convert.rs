// ── API-to-domain type conversions ──
//
// Bridges raw `unimux_api::models` payloads into the normalized model. Each
// backend family gets its own mapping; string fallbacks skip empty values
// so `""` never shadows a populated alternative.

use unimux_api::models::{
    IntegrationClientEntry, IntegrationDevice, IntegrationSite, LegacyAlarm, LegacyDevice,
    LegacyKnownUser, LegacySite, LegacyStation,
};

use crate::model::{Alarm, Client, Device, Site};

// ── Helpers ────────────────────────────────────────────────────────

/// First candidate that is present and non-empty.
fn first_of<const N: usize>(candidates: [Option<&String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
}

/// First non-zero counter, else whichever was present.
fn first_counter(primary: Option<u64>, secondary: Option<u64>) -> Option<u64> {
    match primary {
        Some(v) if v != 0 => Some(v),
        _ => secondary.or(primary),
    }
}

// ── Site ───────────────────────────────────────────────────────────

impl From<LegacySite> for Site {
    fn from(s: LegacySite) -> Self {
        let id = first_of([s.id.as_ref(), s.mongo_id.as_ref(), s.name.as_ref()]).unwrap_or_default();
        let name = first_of([
            s.name.as_ref(),
            s.desc.as_ref(),
            s.display_name.as_ref(),
            s.internal_reference.as_ref(),
        ])
        .unwrap_or_else(|| id.clone());
        Site {
            desc: first_of([s.desc.as_ref(), s.description.as_ref()]),
            id,
            name,
        }
    }
}

impl From<IntegrationSite> for Site {
    fn from(s: IntegrationSite) -> Self {
        let id = first_of([s.id.as_ref(), s.mongo_id.as_ref(), s.name.as_ref()]).unwrap_or_default();
        let name = first_of([
            s.name.as_ref(),
            s.desc.as_ref(),
            s.display_name.as_ref(),
            s.internal_reference.as_ref(),
        ])
        .unwrap_or_else(|| id.clone());
        Site {
            desc: first_of([s.desc.as_ref(), s.description.as_ref()]),
            id,
            name,
        }
    }
}

// ── Device ─────────────────────────────────────────────────────────

/// Infer the short device family for integration payloads.
///
/// An explicit `type` wins. Otherwise the model string decides, with the
/// `accessPoint` feature flag as an extra AP signal.
pub fn infer_device_type(
    explicit: Option<&str>,
    model: Option<&str>,
    features: &[String],
) -> Option<String> {
    if let Some(t) = explicit.filter(|t| !t.is_empty()) {
        return Some(t.to_owned());
    }
    let model = model.map(str::to_lowercase).unwrap_or_default();
    let is_ap_feature = features.iter().any(|f| f == "accessPoint");

    let family = if model.contains("usw") || model.contains("usl") {
        "usw"
    } else if model.contains("uap") || model.contains("u6") || model.contains("u7") || is_ap_feature
    {
        "uap"
    } else if ["udm", "udr", "ucg", "uxg"]
        .iter()
        .any(|p| model.starts_with(p))
    {
        "udm"
    } else if model.starts_with("ugw") {
        "ugw"
    } else {
        return None;
    };
    Some(family.to_owned())
}

impl From<LegacyDevice> for Device {
    fn from(d: LegacyDevice) -> Self {
        Device {
            name: first_of([d.name.as_ref(), d.adopted_name.as_ref(), d.hostname.as_ref()]),
            mac: d.mac,
            device_type: d.device_type,
            model: d.model,
            ip: d.ip,
            version: d.version,
            adopted: d.adopted,
            state: d.state,
            uptime: d.uptime,
            site_id: d.site_id,
        }
    }
}

/// Map an integration device, stamping the resolved site id.
pub fn integration_device(d: IntegrationDevice, site_id: &str) -> Device {
    let online = d.state.as_deref() == Some("ONLINE");
    Device {
        mac: first_of([d.mac_address.as_ref(), d.mac.as_ref()]).unwrap_or_default(),
        device_type: infer_device_type(d.device_type.as_deref(), d.model.as_deref(), &d.features),
        name: d.name,
        ip: first_of([d.ip_address.as_ref(), d.ip.as_ref()]),
        version: first_of([d.firmware_version.as_ref(), d.version.as_ref()]),
        adopted: if online { Some(true) } else { d.adopted },
        state: Some(i64::from(online)),
        uptime: d.uptime,
        site_id: Some(site_id.to_owned()),
        model: d.model,
    }
}

// ── Client ─────────────────────────────────────────────────────────

impl From<LegacyStation> for Client {
    fn from(c: LegacyStation) -> Self {
        Client {
            hostname: first_of([c.hostname.as_ref(), c.name.as_ref()]),
            mac: c.mac,
            ip: c.ip,
            user_id: c.user_id,
            is_active: true,
            ap_mac: c.ap_mac,
            rx_bytes: c.rx_bytes,
            tx_bytes: c.tx_bytes,
            site_id: c.site_id,
        }
    }
}

/// Left-join a known user with its active station record, if any.
///
/// Connection details come from the active record; the IP falls back to the
/// user's `last_ip` when the client is offline.
pub fn known_client(user: LegacyKnownUser, active: Option<&LegacyStation>) -> Client {
    Client {
        hostname: first_of([user.hostname.as_ref(), user.name.as_ref()]),
        ip: first_of([active.and_then(|a| a.ip.as_ref()), user.last_ip.as_ref()]),
        user_id: user.id,
        is_active: active.is_some(),
        ap_mac: active.and_then(|a| a.ap_mac.clone()),
        rx_bytes: active.and_then(|a| a.rx_bytes),
        tx_bytes: active.and_then(|a| a.tx_bytes),
        site_id: user.site_id,
        mac: user.mac,
    }
}

/// Map an integration client, stamping the resolved site id.
pub fn integration_client(c: IntegrationClientEntry, site_id: &str) -> Client {
    Client {
        mac: first_of([c.mac_address.as_ref(), c.mac.as_ref()]).unwrap_or_default(),
        hostname: first_of([c.name.as_ref(), c.hostname.as_ref()]),
        ip: first_of([c.ip_address.as_ref(), c.ip.as_ref()]),
        user_id: first_of([c.id.as_ref(), c.user_id.as_ref()]),
        is_active: c.connected_at.as_ref().is_some_and(|v| !v.is_null()),
        ap_mac: c.uplink_device_id,
        rx_bytes: first_counter(c.rx_bytes, c.rx_bytes_legacy),
        tx_bytes: first_counter(c.tx_bytes, c.tx_bytes_legacy),
        site_id: Some(site_id.to_owned()),
    }
}

// ── Alarm ──────────────────────────────────────────────────────────

impl From<LegacyAlarm> for Alarm {
    fn from(a: LegacyAlarm) -> Self {
        Alarm {
            time: a.time.unwrap_or(0),
            key: a.key,
            msg: a.msg,
            archived: a.archived.unwrap_or(false),
            site_id: a.site_id,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn from_json<T: serde::de::DeserializeOwned>(v: serde_json::Value) -> T {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn classic_site_fallbacks() {
        let site: Site = from_json::<LegacySite>(json!({
            "_id": "5f1", "name": "default", "desc": "Default"
        }))
        .into();
        assert_eq!(
            site,
            Site {
                id: "5f1".into(),
                name: "default".into(),
                desc: Some("Default".into()),
            }
        );

        let bare: Site = from_json::<LegacySite>(json!({ "name": "branch" })).into();
        assert_eq!(bare.id, "branch");
        assert_eq!(bare.desc, None);
    }

    #[test]
    fn integration_site_uses_internal_reference_for_name() {
        let site: Site = from_json::<IntegrationSite>(json!({
            "id": "88f7af54-98f8-306a-a1c7-c9349722b1f6",
            "internalReference": "default"
        }))
        .into();
        assert_eq!(site.name, "default");
        assert!(site.matches("default"));
        assert!(site.matches("88f7af54-98f8-306a-a1c7-c9349722b1f6"));
    }

    #[test]
    fn integration_site_follows_the_shared_fallback_chain() {
        let site: Site = from_json::<IntegrationSite>(json!({
            "id": "s-2",
            "desc": "Lab",
            "displayName": "Lab Network",
            "internalReference": "lab",
            "description": "second floor"
        }))
        .into();
        assert_eq!(site.name, "Lab");
        assert_eq!(site.desc.as_deref(), Some("Lab"));

        let site: Site = from_json::<IntegrationSite>(json!({
            "id": "s-3",
            "display_name": "Branch",
            "internalReference": "branch",
            "description": "remote office"
        }))
        .into();
        assert_eq!(site.name, "Branch");
        assert_eq!(site.desc.as_deref(), Some("remote office"));

        let site: Site = from_json::<IntegrationSite>(json!({ "_id": "5f0" })).into();
        assert_eq!(site.id, "5f0");
        assert_eq!(site.name, "5f0");
    }

    #[test]
    fn device_type_heuristic() {
        let none: &[String] = &[];
        assert_eq!(infer_device_type(Some("ugw"), Some("USW-24"), none).as_deref(), Some("ugw"));
        assert_eq!(infer_device_type(None, Some("USW-Lite-8-PoE"), none).as_deref(), Some("usw"));
        assert_eq!(infer_device_type(None, Some("USL16P"), none).as_deref(), Some("usw"));
        assert_eq!(infer_device_type(None, Some("U6-Pro"), none).as_deref(), Some("uap"));
        assert_eq!(infer_device_type(None, Some("U7-Pro-Max"), none).as_deref(), Some("uap"));
        assert_eq!(infer_device_type(None, Some("UDR"), none).as_deref(), Some("udm"));
        assert_eq!(infer_device_type(None, Some("UCG-Ultra"), none).as_deref(), Some("udm"));
        assert_eq!(infer_device_type(None, Some("UGW3"), none).as_deref(), Some("ugw"));
        assert_eq!(
            infer_device_type(None, Some("Mystery"), &["accessPoint".to_owned()]).as_deref(),
            Some("uap")
        );
        assert_eq!(infer_device_type(None, None, none), None);
    }

    #[test]
    fn classic_device_name_falls_back_to_hostname() {
        let dev: Device = from_json::<LegacyDevice>(json!({
            "mac": "aa:bb:cc:00:00:01", "type": "usw", "name": "",
            "hostname": "switch-closet", "state": 1, "adopted": true
        }))
        .into();
        assert_eq!(dev.name.as_deref(), Some("switch-closet"));
        assert_eq!(dev.state, Some(1));
    }

    #[test]
    fn integration_device_online_implies_adopted() {
        let dev = integration_device(
            from_json(json!({
                "id": "d1", "macAddress": "aa:bb:cc:00:00:02", "model": "U6-LR",
                "ipAddress": "10.0.0.9", "firmwareVersion": "6.6.55", "state": "ONLINE"
            })),
            "site-uuid",
        );
        assert_eq!(
            dev,
            Device {
                mac: "aa:bb:cc:00:00:02".into(),
                device_type: Some("uap".into()),
                model: Some("U6-LR".into()),
                name: None,
                ip: Some("10.0.0.9".into()),
                version: Some("6.6.55".into()),
                adopted: Some(true),
                state: Some(1),
                uptime: None,
                site_id: Some("site-uuid".into()),
            }
        );

        let offline = integration_device(from_json(json!({ "state": "OFFLINE" })), "s");
        assert_eq!(offline.state, Some(0));
        assert_eq!(offline.adopted, None);
    }

    #[test]
    fn known_client_joins_active_record() {
        let user: LegacyKnownUser = from_json(json!({
            "_id": "u1", "mac": "AA:BB", "hostname": "h1", "last_ip": "10.0.0.1"
        }));
        let sta: LegacyStation =
            from_json(json!({ "mac": "AA:BB", "ip": "10.0.0.5", "rx_bytes": 100 }));

        let joined = known_client(user.clone(), Some(&sta));
        assert!(joined.is_active);
        assert_eq!(joined.ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(joined.rx_bytes, Some(100));
        assert_eq!(joined.hostname.as_deref(), Some("h1"));
        assert_eq!(joined.user_id.as_deref(), Some("u1"));

        let offline = known_client(user, None);
        assert!(!offline.is_active);
        assert_eq!(offline.ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(offline.rx_bytes, None);
    }

    #[test]
    fn integration_client_active_from_connected_at() {
        let c = integration_client(
            from_json(json!({
                "id": "c1", "macAddress": "aa:bb", "name": "laptop",
                "connectedAt": "2024-05-01T10:00:00Z", "uplinkDeviceId": "dev-1", "rxBytes": 5
            })),
            "s1",
        );
        assert!(c.is_active);
        assert_eq!(c.user_id.as_deref(), Some("c1"));
        assert_eq!(c.ap_mac.as_deref(), Some("dev-1"));
        assert_eq!(c.rx_bytes, Some(5));

        let idle = integration_client(from_json(json!({ "id": "c2", "connectedAt": null })), "s1");
        assert!(!idle.is_active);
    }

    #[test]
    fn alarm_defaults() {
        let alarm: Alarm = from_json::<LegacyAlarm>(json!({ "key": "EVT_AP_Lost_Contact" })).into();
        assert_eq!(alarm.time, 0);
        assert!(!alarm.archived);
    }
}
