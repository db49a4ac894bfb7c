// ── Normalized domain model ──
//
// One type per entity, independent of which backend family produced it.
// Field names are part of the tool output contract.

pub mod alarm;
pub mod client;
pub mod device;
pub mod site;

pub use alarm::Alarm;
pub use client::Client;
pub use device::Device;
pub use site::Site;
