// ── Sites ──
//
// API-key targets list sites through the integration API. Session targets
// walk a fallback chain of controller endpoints; the first 2xx response
// carrying a data array wins, and when none does the last error surfaces.

use tracing::debug;
use unimux_api::models::{IntegrationSite, LegacyEnvelope, LegacySite, Page};
use unimux_api::{
    ApiRequest, ApiResponse, ControllerFlavor, Error, TargetClient, controller_path,
    integration_path,
};

use super::{ApiFamily, FetchOptions, data_array};
use crate::envelope::ResultEnvelope;
use crate::error::CoreError;
use crate::model::Site;

/// Integration API pagination and filtering. Only supplied values are sent.
#[derive(Debug, Clone, Default)]
pub struct SitePage {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub filter: Option<String>,
}

impl SitePage {
    fn apply(&self, mut req: ApiRequest) -> ApiRequest {
        if let Some(offset) = self.offset {
            req = req.query("offset", offset);
        }
        if let Some(limit) = self.limit {
            req = req.query("limit", limit);
        }
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.is_empty()) {
            req = req.query("filter", filter);
        }
        req
    }
}

/// Candidate requests, tried in order.
fn candidates(client: &TargetClient, page: &SitePage) -> Vec<ApiRequest> {
    let target = client.target();
    match ApiFamily::for_client(client) {
        ApiFamily::Integration => {
            vec![page.apply(ApiRequest::get(integration_path(target, "sites")))]
        }
        ApiFamily::Classic => match target.flavor {
            ControllerFlavor::UnifiOs => vec![
                ApiRequest::get(controller_path(target, "self/sites", true)),
                ApiRequest::get(controller_path(target, "self/sites", false)),
            ],
            ControllerFlavor::Classic => {
                vec![ApiRequest::get(controller_path(target, "self/sites", false))]
            }
        },
    }
}

/// Normalize a winning response. Returns the sites and the truncation flag.
fn sites_from(family: ApiFamily, resp: &ApiResponse) -> Result<(Vec<Site>, bool), Error> {
    let bare = resp.body.is_array();
    match family {
        ApiFamily::Integration if bare => {
            let sites: Vec<IntegrationSite> = resp.json()?;
            Ok((sites.into_iter().map(Site::from).collect(), false))
        }
        ApiFamily::Integration => {
            let page: Page<IntegrationSite> = resp.json()?;
            let truncated = page.truncated();
            Ok((page.data.into_iter().map(Site::from).collect(), truncated))
        }
        ApiFamily::Classic if bare => {
            let sites: Vec<LegacySite> = resp.json()?;
            Ok((sites.into_iter().map(Site::from).collect(), false))
        }
        ApiFamily::Classic => {
            let envelope: LegacyEnvelope<LegacySite> = resp.json()?;
            let truncated = envelope.truncated();
            Ok((envelope.data.into_iter().map(Site::from).collect(), truncated))
        }
    }
}

fn no_data_array(resp: &ApiResponse) -> Error {
    if resp.is_success() {
        Error::Deserialization {
            message: format!("HTTP {}: response carries no site list", resp.status.as_u16()),
            body: resp.body.to_string(),
        }
    } else {
        resp.to_error()
    }
}

/// List the target's sites.
pub async fn list_sites(
    client: &TargetClient,
    opts: &FetchOptions,
    page: &SitePage,
) -> Result<ResultEnvelope<Vec<Site>>, CoreError> {
    client.ensure_session().await?;
    let family = ApiFamily::for_client(client);

    let mut last_err = None;
    for req in candidates(client, page) {
        let path = req.path.clone();
        let resp = client.send(req).await?;
        if resp.is_success() && data_array(&resp.body).is_some() {
            let (sites, truncated) = sites_from(family, &resp)?;
            debug!(target = %client.target().id, path = %path, count = sites.len(), "sites listed");
            return Ok(ResultEnvelope::new(sites)
                .truncated(truncated)
                .with_raw(opts.raw, || resp.body));
        }
        debug!(
            target = %client.target().id,
            path = %path,
            status = resp.status.as_u16(),
            "site endpoint rejected, trying next"
        );
        last_err = Some(no_data_array(&resp));
    }

    Err(last_err.map_or_else(
        || CoreError::SiteNotFound {
            name: client.target().default_site.clone(),
        },
        CoreError::from,
    ))
}

/// Resolve a site name or id to the integration site id.
pub async fn resolve_site_id(client: &TargetClient, site: &str) -> Result<String, CoreError> {
    let sites = list_sites(client, &FetchOptions::default(), &SitePage::default()).await?;
    sites
        .data
        .into_iter()
        .find(|s| s.matches(site))
        .map(|s| s.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CoreError::SiteNotFound {
            name: site.to_owned(),
        })
}
