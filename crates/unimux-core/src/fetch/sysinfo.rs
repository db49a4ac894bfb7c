// ── Sysinfo ──

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;
use unimux_api::{ApiRequest, TargetClient, controller_path, integration_path, site_path};

use super::{ApiFamily, FetchOptions, data_or_body, expect_success};
use crate::envelope::ResultEnvelope;
use crate::error::CoreError;

/// Controller identity and version information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SysinfoReport {
    /// `stat/sysinfo` data (classic) or the integration `info` document.
    pub sysinfo: Value,
    /// Controller `/api/status`, when it answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

/// Fetch controller system information.
///
/// Session targets also ask the controller-level `status` endpoint; that
/// call is best-effort and its failure leaves `status` absent.
pub async fn get_sysinfo(
    client: &TargetClient,
    opts: &FetchOptions,
) -> Result<ResultEnvelope<SysinfoReport>, CoreError> {
    client.ensure_session().await?;
    let target = client.target();

    if ApiFamily::for_client(client) == ApiFamily::Integration {
        let info = expect_success(
            client
                .send(ApiRequest::get(integration_path(target, "info")))
                .await?,
        )?;
        let report = SysinfoReport {
            sysinfo: data_or_body(&info.body),
            status: None,
        };
        return Ok(ResultEnvelope::new(report).with_raw(opts.raw, || info.body));
    }

    let site = opts.site_for(client);
    let sys_req = ApiRequest::get(site_path(target, site, "stat/sysinfo"));
    let status_req = ApiRequest::get(controller_path(target, "status", false));

    let (sys, status) = tokio::join!(client.send(sys_req), client.send(status_req));
    let sys = expect_success(sys?)?;

    let status = match status {
        Ok(resp) if resp.is_success() => Some(resp.body),
        Ok(resp) => {
            debug!(target = %target.id, status = resp.status.as_u16(), "controller status unavailable");
            None
        }
        Err(e) => {
            debug!(target = %target.id, error = %e, "controller status unavailable");
            None
        }
    };

    let report = SysinfoReport {
        sysinfo: data_or_body(&sys.body),
        status,
    };
    let raw_status = report.status.clone();
    Ok(ResultEnvelope::new(report)
        .with_raw(opts.raw, || json!({ "sys": sys.body, "status": raw_status })))
}
