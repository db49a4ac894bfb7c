// ── Devices ──

use serde_json::json;
use tracing::debug;
use unimux_api::models::{IntegrationDevice, LegacyDevice, LegacyEnvelope, Page};
use unimux_api::{ApiRequest, ControllerFlavor, TargetClient, integration_path, site_path};

use super::{ApiFamily, FetchOptions, expect_success, resolve_site_id};
use crate::convert::integration_device;
use crate::envelope::ResultEnvelope;
use crate::error::CoreError;
use crate::model::Device;

/// List adopted devices, optionally narrowed to `macs`.
///
/// The MAC filter is honored server-side where the controller supports it:
/// classic controllers accept a POST body, UniFi OS a single-MAC path.
/// Several MACs on UniFi OS return the full list unfiltered.
pub async fn get_devices(
    client: &TargetClient,
    opts: &FetchOptions,
    macs: &[String],
) -> Result<ResultEnvelope<Vec<Device>>, CoreError> {
    client.ensure_session().await?;
    let target = client.target();
    let site = opts.site_for(client);

    if ApiFamily::for_client(client) == ApiFamily::Integration {
        let site_id = resolve_site_id(client, site).await?;
        let path = integration_path(
            target,
            &format!("sites/{}/devices", urlencoding::encode(&site_id)),
        );
        let resp = expect_success(client.send(ApiRequest::get(path)).await?)?;
        let page: Page<IntegrationDevice> = resp.json()?;
        let truncated = page.truncated();
        let devices = page
            .data
            .into_iter()
            .map(|d| integration_device(d, &site_id))
            .collect();
        return Ok(ResultEnvelope::new(devices)
            .truncated(truncated)
            .with_raw(opts.raw, || resp.body));
    }

    let req = match (macs, target.flavor) {
        ([], _) => ApiRequest::get(site_path(target, site, "stat/device")),
        (_, ControllerFlavor::Classic) => {
            ApiRequest::post(site_path(target, site, "stat/device"), json!({ "macs": macs }))
        }
        ([mac], ControllerFlavor::UnifiOs) => ApiRequest::get(site_path(
            target,
            site,
            &format!("stat/device/{}", urlencoding::encode(mac)),
        )),
        (_, ControllerFlavor::UnifiOs) => {
            debug!(target = %target.id, count = macs.len(), "MAC filter not applied for multiple MACs");
            ApiRequest::get(site_path(target, site, "stat/device"))
        }
    };

    let resp = expect_success(client.send(req).await?)?;
    let envelope: LegacyEnvelope<LegacyDevice> = resp.json()?;
    let truncated = envelope.truncated();
    let devices = envelope.data.into_iter().map(Device::from).collect();
    Ok(ResultEnvelope::new(devices)
        .truncated(truncated)
        .with_raw(opts.raw, || resp.body))
}
