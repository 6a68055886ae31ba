//! Descriptor registry.
//!
//! Adding a resource type means adding one static here; the client, CLI and
//! MCP server pick it up from [`ALL`].

mod firewall;
mod network;
mod system;

pub use firewall::{FIREWALL_ADDRESS, FIREWALL_ADDRGRP, FIREWALL_POLICY};
pub use network::{ENDPOINT_CONTROL_FCTEMS, ROUTER_STATIC, SWITCH_CONTROLLER_MANAGED_SWITCH};
pub use system::{MONITOR_SYSTEM_STATUS, SYSTEM_DNS};

use crate::error::{FortiError, Result};
use crate::resource::{ApiCategory, ResourceDescriptor};

/// Every known descriptor.
pub static ALL: &[&ResourceDescriptor] = &[
    &FIREWALL_ADDRESS,
    &FIREWALL_ADDRGRP,
    &FIREWALL_POLICY,
    &ROUTER_STATIC,
    &SYSTEM_DNS,
    &SWITCH_CONTROLLER_MANAGED_SWITCH,
    &ENDPOINT_CONTROL_FCTEMS,
    &MONITOR_SYSTEM_STATUS,
];

/// Find a descriptor by path.
///
/// Accepts `firewall/address`, `cmdb/firewall/address` and
/// `monitor/system/status`. An unqualified path prefers the CMDB entry.
pub fn lookup(path: &str) -> Result<&'static ResourceDescriptor> {
    let path = path.trim().trim_matches('/');
    let (category, rest) = match path.split_once('/') {
        Some(("cmdb", rest)) => (Some(ApiCategory::Cmdb), rest),
        Some(("monitor", rest)) => (Some(ApiCategory::Monitor), rest),
        _ => (None, path),
    };

    let candidates: Vec<&'static ResourceDescriptor> = ALL
        .iter()
        .copied()
        .filter(|d| d.path == rest && category.map_or(true, |c| d.category == c))
        .collect();

    candidates
        .iter()
        .copied()
        .find(|d| d.category == ApiCategory::Cmdb)
        .or_else(|| candidates.first().copied())
        .ok_or_else(|| FortiError::UnknownResource(path.to_string()))
}
