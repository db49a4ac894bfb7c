//! `unimux check`: list sites on every target, one JSON line per target.
//!
//! Report-only. A failing target is printed with its error and the process
//! still exits successfully.

use std::io::Write;

use serde_json::{Value, json};
use unimux_core::{FetchOptions, SitePage, TargetRegistry, list_sites};

use crate::error::ServerError;

pub async fn run(registry: &TargetRegistry, out: &mut impl Write) -> Result<(), ServerError> {
    for target in registry.targets() {
        let line = match check_target(registry, &target.id).await {
            Ok(sites) => json!({ "target": target.id, "sites": sites }),
            Err(err) => {
                tracing::warn!(target = %target.id, error = %err, "site listing failed");
                json!({ "target": target.id, "error": err.to_string() })
            }
        };
        writeln!(out, "{line}")?;
    }
    Ok(())
}

async fn check_target(
    registry: &TargetRegistry,
    id: &str,
) -> Result<Value, unimux_core::CoreError> {
    let client = registry.client(Some(id))?;
    let sites = list_sites(&client, &FetchOptions::default(), &SitePage::default()).await?;
    Ok(serde_json::to_value(sites.data).unwrap_or(Value::Null))
}
