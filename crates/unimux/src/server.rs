//! MCP server exposing every configured target through six tools.
//!
//! Each call resolves its target through the shared [`TargetRegistry`], runs
//! one fetcher, and answers with a structured `{ tool, targetId, result }`
//! payload. Failures are never protocol errors: they come back as
//! `{ tool, targetId, error }` with the MCP error flag set.

use std::future::Future;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};
use unimux_api::TargetClient;
use unimux_core::{CoreError, TargetRegistry};

use crate::tools::{
    AlarmsArgs, ClientsArgs, DevicesArgs, GLOBAL_TARGET, ListSitesArgs, SiteArgs, error_payload,
    success_payload,
};

const INSTRUCTIONS: &str = "unimux exposes UniFi Network controllers. Call list_targets to see \
    the configured controllers; every other tool takes an optional targetId (required when more \
    than one target is configured), an optional site, and raw=true to include the controller's \
    unprocessed payload. Tools: list_sites, get_sysinfo, get_devices (macs filter), get_clients \
    (activeOnly), get_alarms (archived).";

#[derive(Clone)]
pub struct UnimuxServer {
    registry: Arc<TargetRegistry>,
    tool_router: ToolRouter<UnimuxServer>,
}

impl UnimuxServer {
    pub fn new(registry: Arc<TargetRegistry>) -> Self {
        Self {
            registry,
            tool_router: Self::tool_router(),
        }
    }

    /// Resolve the target, run `fetch` against its client, and wrap the
    /// outcome in a success or error payload.
    async fn dispatch<T, F, Fut>(
        &self,
        tool: &'static str,
        requested: Option<&str>,
        fetch: F,
    ) -> CallToolResult
    where
        T: Serialize,
        F: FnOnce(Arc<TargetClient>) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let target_id = match self.registry.resolve(requested) {
            Ok(target) => target.id.clone(),
            Err(_) => requested.unwrap_or_default().to_owned(),
        };

        let outcome = match self.registry.client(requested) {
            Ok(client) => fetch(client).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                debug!(tool, target = %target_id, "tool call succeeded");
                CallToolResult::structured(success_payload(tool, &target_id, result))
            }
            Err(err) => {
                warn!(tool, target = %target_id, error = %err, "tool call failed");
                CallToolResult::structured_error(error_payload(tool, &target_id, &err.to_string()))
            }
        }
    }
}

// ── Tools ────────────────────────────────────────────────────────────

#[tool_router]
impl UnimuxServer {
    #[tool(description = "List configured UniFi controller targets (ids and metadata, no secrets)")]
    #[allow(clippy::unused_async)]
    async fn list_targets(&self) -> Result<CallToolResult, ErrorData> {
        Ok(CallToolResult::structured(json!({
            "tool": "list_targets",
            "targetId": GLOBAL_TARGET,
            "targets": self.registry.summaries(),
        })))
    }

    #[tool(description = "List all sites available on a UniFi controller target")]
    async fn list_sites(
        &self,
        Parameters(args): Parameters<ListSitesArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let opts = crate::tools::fetch_options(None, args.raw);
        let page = args.page();
        Ok(self
            .dispatch("list_sites", args.target_id.as_deref(), |client| async move {
                unimux_core::list_sites(&client, &opts, &page).await
            })
            .await)
    }

    #[tool(description = "Retrieve UniFi controller and site sysinfo")]
    async fn get_sysinfo(
        &self,
        Parameters(args): Parameters<SiteArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let opts = args.options();
        Ok(self
            .dispatch("get_sysinfo", args.target_id.as_deref(), |client| async move {
                unimux_core::get_sysinfo(&client, &opts).await
            })
            .await)
    }

    #[tool(description = "Retrieve UniFi devices (switches, APs, gateways) for a site")]
    async fn get_devices(
        &self,
        Parameters(args): Parameters<DevicesArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let opts = args.common.options();
        let macs = args.macs.unwrap_or_default();
        Ok(self
            .dispatch("get_devices", args.common.target_id.as_deref(), |client| async move {
                unimux_core::get_devices(&client, &opts, &macs).await
            })
            .await)
    }

    #[tool(description = "Retrieve active or known clients for a UniFi site")]
    async fn get_clients(
        &self,
        Parameters(args): Parameters<ClientsArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let opts = args.common.options();
        let active_only = args.active_only.unwrap_or(false);
        Ok(self
            .dispatch("get_clients", args.common.target_id.as_deref(), |client| async move {
                unimux_core::get_clients(&client, &opts, active_only).await
            })
            .await)
    }

    #[tool(description = "Retrieve UniFi alarms for a site")]
    async fn get_alarms(
        &self,
        Parameters(args): Parameters<AlarmsArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        let opts = args.common.options();
        let archived = args.archived;
        Ok(self
            .dispatch("get_alarms", args.common.target_id.as_deref(), |client| async move {
                unimux_core::get_alarms(&client, &opts, archived).await
            })
            .await)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for UnimuxServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "unimux".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use unimux_api::{ControllerFlavor, Target, TargetAuth};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    // ── Helpers ──────────────────────────────────────────────────────

    fn api_key_target(id: &str, base: &str) -> Target {
        Target::new(
            id,
            base.parse().unwrap(),
            ControllerFlavor::UnifiOs,
            "default",
            TargetAuth::ApiKey {
                key: SecretString::from("secret-key".to_owned()),
                header_name: None,
                scheme: None,
            },
        )
        .with_rate_limit(100.0)
    }

    fn server(targets: Vec<Target>) -> UnimuxServer {
        UnimuxServer::new(Arc::new(TargetRegistry::new(targets).unwrap()))
    }

    fn structured(result: &CallToolResult) -> Value {
        result.structured_content.clone().unwrap()
    }

    fn is_error(result: &CallToolResult) -> bool {
        result.is_error.unwrap_or(false)
    }

    // ── Tests ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_list_targets_omits_credentials() {
        let srv = server(vec![api_key_target("home", "https://10.0.0.1")]);
        let result = srv.list_targets().await.unwrap();

        assert!(!is_error(&result));
        let body = structured(&result);
        assert_eq!(body["tool"], "list_targets");
        assert_eq!(body["targetId"], "global");
        assert_eq!(
            body["targets"],
            json!([{
                "id": "home",
                "base_url": "https://10.0.0.1/",
                "controller_type": "unifi_os",
                "default_site": "default"
            }])
        );
        assert!(!body.to_string().contains("secret-key"));
    }

    #[tokio::test]
    async fn test_single_target_is_used_without_target_id() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/proxy/network/integration/v1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": "s-1", "internalReference": "default", "name": "Default" }],
                "offset": 0, "limit": 25, "count": 1, "totalCount": 1
            })))
            .expect(1)
            .mount(&mock)
            .await;

        let srv = server(vec![api_key_target("home", &mock.uri())]);
        let result = srv
            .list_sites(Parameters(ListSitesArgs::default()))
            .await
            .unwrap();

        assert!(!is_error(&result));
        let body = structured(&result);
        assert_eq!(body["tool"], "list_sites");
        assert_eq!(body["targetId"], "home");
        assert_eq!(body["result"]["data"][0]["id"], "s-1");
        assert!(body["result"].get("raw").is_none());
    }

    #[tokio::test]
    async fn test_missing_target_id_with_several_targets_is_an_error_payload() {
        let srv = server(vec![
            api_key_target("a", "https://10.0.0.1"),
            api_key_target("b", "https://10.0.0.2"),
        ]);
        let result = srv.get_sysinfo(Parameters(SiteArgs::default())).await.unwrap();

        assert!(is_error(&result));
        let body = structured(&result);
        assert_eq!(body["tool"], "get_sysinfo");
        assert_eq!(body["targetId"], "");
        assert!(body["error"].as_str().unwrap().contains("targetId is required"));
    }

    #[tokio::test]
    async fn test_unknown_target_is_an_error_payload() {
        let srv = server(vec![api_key_target("a", "https://10.0.0.1")]);
        let args = AlarmsArgs {
            common: SiteArgs {
                target_id: Some("nope".into()),
                ..SiteArgs::default()
            },
            archived: None,
        };
        let result = srv.get_alarms(Parameters(args)).await.unwrap();

        assert!(is_error(&result));
        let body = structured(&result);
        assert_eq!(body["targetId"], "nope");
        assert_eq!(body["error"], "Unknown target: nope");
    }

    #[tokio::test]
    async fn test_controller_failure_is_an_error_payload() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/proxy/network/integration/v1/sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{ "id": "s-1", "internalReference": "default", "name": "default" }],
                "totalCount": 1
            })))
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/proxy/network/integration/v1/sites/s-1/devices"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&mock)
            .await;

        let srv = server(vec![api_key_target("home", &mock.uri())]);
        let result = srv
            .get_devices(Parameters(DevicesArgs::default()))
            .await
            .unwrap();

        assert!(is_error(&result));
        let body = structured(&result);
        assert_eq!(body["tool"], "get_devices");
        assert_eq!(body["targetId"], "home");
        assert!(body["error"].as_str().unwrap().starts_with("HTTP 403"));
    }

    #[test]
    fn test_server_info_advertises_tools() {
        let srv = server(vec![api_key_target("home", "https://10.0.0.1")]);
        let info = srv.get_info();
        assert_eq!(info.server_info.name, "unimux");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("list_targets"));
    }
}
