//! Domain layer between `unimux-api` and the MCP tool surface.
//!
//! - **[`fetch`]**: one fetcher per resource (sites, sysinfo, devices,
//!   clients, alarms). Each picks the API family from the target's auth
//!   mode and reconciles backend payloads into the normalized [`model`].
//! - **[`TargetRegistry`]**: validated targets plus one cached
//!   `TargetClient` per target.
//! - **[`ResultEnvelope`]**: `{ data, truncated?, raw? }`, the uniform
//!   return shape of every fetch.

pub mod convert;
pub mod envelope;
pub mod error;
pub mod fetch;
pub mod model;
pub mod registry;

pub use envelope::ResultEnvelope;
pub use error::CoreError;
pub use fetch::{
    ApiFamily, FetchOptions, SitePage, SysinfoReport, get_alarms, get_clients, get_devices,
    get_sysinfo, list_sites, resolve_site_id,
};
pub use model::{Alarm, Client, Device, Site};
pub use registry::{TargetRegistry, TargetSummary};
