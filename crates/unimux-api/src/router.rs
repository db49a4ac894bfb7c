// ── Path routing ──
//
// Pure mapping from (target, logical resource) to a relative URL path.
// Three address families:
//   site API        {prefix}/api/s/{site}/{subpath}
//   controller API  [/proxy/network]/api/{subpath}
//   integration API {prefix}/integration/v1/{subpath}

use crate::auth::ControllerFlavor;
use crate::target::Target;

/// Site-scoped path: `{prefix}/api/s/{site}/{subpath}`.
///
/// The site is percent-encoded as a single path segment.
pub fn site_path(target: &Target, site: &str, subpath: &str) -> String {
    format!(
        "{}/api/s/{}/{subpath}",
        target.flavor.network_prefix(),
        urlencoding::encode(site)
    )
}

/// Controller-level path. The proxy prefix is applied only when the target
/// is UniFi OS *and* the caller prefers it.
pub fn controller_path(target: &Target, subpath: &str, prefer_proxy: bool) -> String {
    if target.flavor == ControllerFlavor::UnifiOs && prefer_proxy {
        format!("/proxy/network/api/{subpath}")
    } else {
        format!("/api/{subpath}")
    }
}

/// Integration API path: `{prefix}/integration/v1/{subpath}`.
pub fn integration_path(target: &Target, subpath: &str) -> String {
    format!("{}/integration/v1/{subpath}", target.flavor.network_prefix())
}
