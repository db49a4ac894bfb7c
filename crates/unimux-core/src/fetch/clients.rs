// ── Clients ──
//
// The full classic listing joins two views of the same site: every known
// user (`rest/user`) and the currently associated stations (`stat/sta`).
// Both requests are issued together and still pass through the target's
// rate limiter.

use std::collections::HashMap;

use serde_json::json;
use unimux_api::models::{IntegrationClientEntry, LegacyEnvelope, LegacyKnownUser, LegacyStation, Page};
use unimux_api::{ApiRequest, TargetClient, integration_path, site_path};

use super::{ApiFamily, FetchOptions, expect_success, resolve_site_id};
use crate::convert::{integration_client, known_client};
use crate::envelope::ResultEnvelope;
use crate::error::CoreError;
use crate::model::Client;

/// List clients. `active_only` restricts session targets to associated stations.
pub async fn get_clients(
    client: &TargetClient,
    opts: &FetchOptions,
    active_only: bool,
) -> Result<ResultEnvelope<Vec<Client>>, CoreError> {
    client.ensure_session().await?;
    let target = client.target();
    let site = opts.site_for(client);

    if ApiFamily::for_client(client) == ApiFamily::Integration {
        let site_id = resolve_site_id(client, site).await?;
        let path = integration_path(
            target,
            &format!("sites/{}/clients", urlencoding::encode(&site_id)),
        );
        let resp = expect_success(client.send(ApiRequest::get(path)).await?)?;
        let page: Page<IntegrationClientEntry> = resp.json()?;
        let truncated = page.truncated();
        let clients = page
            .data
            .into_iter()
            .map(|c| integration_client(c, &site_id))
            .collect();
        return Ok(ResultEnvelope::new(clients)
            .truncated(truncated)
            .with_raw(opts.raw, || resp.body));
    }

    if active_only {
        let resp = expect_success(
            client
                .send(ApiRequest::get(site_path(target, site, "stat/sta")))
                .await?,
        )?;
        let envelope: LegacyEnvelope<LegacyStation> = resp.json()?;
        let truncated = envelope.truncated();
        let clients = envelope.data.into_iter().map(Client::from).collect();
        return Ok(ResultEnvelope::new(clients)
            .truncated(truncated)
            .with_raw(opts.raw, || resp.body));
    }

    let (known, active) = tokio::try_join!(
        client.send(ApiRequest::get(site_path(target, site, "rest/user"))),
        client.send(ApiRequest::get(site_path(target, site, "stat/sta"))),
    )?;
    let known = expect_success(known)?;
    let active = expect_success(active)?;

    let users: LegacyEnvelope<LegacyKnownUser> = known.json()?;
    let stations: LegacyEnvelope<LegacyStation> = active.json()?;
    let truncated = users.truncated() || stations.truncated();

    let clients = left_join(users.data, &stations.data);
    Ok(ResultEnvelope::new(clients)
        .truncated(truncated)
        .with_raw(opts.raw, || json!({ "known": known.body, "active": active.body })))
}

/// Every known user, enriched with its active station when one shares its MAC.
fn left_join(users: Vec<LegacyKnownUser>, stations: &[LegacyStation]) -> Vec<Client> {
    let by_mac: HashMap<&str, &LegacyStation> =
        stations.iter().map(|s| (s.mac.as_str(), s)).collect();
    users
        .into_iter()
        .map(|user| {
            let active = by_mac.get(user.mac.as_str()).copied();
            known_client(user, active)
        })
        .collect()
}
