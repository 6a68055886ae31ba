//! Test data fixtures for the mock server.
//!
//! Provides factory functions for realistic FortiOS objects.

use serde_json::{json, Value};

/// Collection of fixture factories for test data.
pub struct Fixtures;

/// The data loaded by [`MockServer::start`](super::MockServer::start).
pub struct DefaultScenario {
    /// `(resource path, entry)` in table order.
    pub entries: Vec<(&'static str, Value)>,
    /// `(resource path, object)` for singletons.
    pub singletons: Vec<(&'static str, Value)>,
    /// Tables that exist but start empty.
    pub empty_tables: Vec<&'static str>,
}

impl Fixtures {
    // =========================================================================
    // Address Fixtures
    // =========================================================================

    /// A host address (`/32`).
    pub fn host_address(name: &str, ip: &str) -> Value {
        json!({
            "name": name,
            "q_origin_key": name,
            "type": "ipmask",
            "subnet": format!("{ip} 255.255.255.255"),
            "comment": "",
            "macaddr": [],
            "color": 0,
        })
    }

    /// An FQDN address.
    pub fn fqdn_address(name: &str, fqdn: &str) -> Value {
        json!({
            "name": name,
            "q_origin_key": name,
            "type": "fqdn",
            "fqdn": fqdn,
            "comment": "",
            "macaddr": [],
            "color": 0,
        })
    }

    /// An address group with the given members.
    pub fn address_group(name: &str, members: &[&str]) -> Value {
        json!({
            "name": name,
            "q_origin_key": name,
            "type": "default",
            "member": members.iter().map(|m| json!({"name": m})).collect::<Vec<_>>(),
            "exclude": "disable",
            "exclude-member": [],
        })
    }

    // =========================================================================
    // Policy Fixtures
    // =========================================================================

    /// An accept policy from `lan` to `wan`.
    pub fn policy(id: u64, name: &str) -> Value {
        json!({
            "policyid": id,
            "q_origin_key": id,
            "name": name,
            "status": "enable",
            "srcintf": [{"name": "lan"}],
            "dstintf": [{"name": "wan"}],
            "srcaddr": [{"name": "all"}],
            "dstaddr": [{"name": "all"}],
            "service": [{"name": "ALL"}],
            "action": "accept",
            "schedule": "always",
            "nat": "enable",
            "logtraffic": "utm",
        })
    }

    // =========================================================================
    // Singleton Fixtures
    // =========================================================================

    /// Factory DNS settings.
    pub fn dns() -> Value {
        json!({
            "primary": "96.45.45.45",
            "secondary": "96.45.46.46",
            "protocol": "cleartext",
            "domain": [],
            "timeout": 5,
            "retry": 2,
        })
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Three addresses, one group, three ordered policies and DNS settings.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario {
            entries: vec![
                ("firewall/address", Self::host_address("web-01", "10.0.1.10")),
                ("firewall/address", Self::host_address("web-02", "10.0.1.11")),
                ("firewall/address", Self::fqdn_address("updates", "update.example.com")),
                ("firewall/addrgrp", Self::address_group("web", &["web-01", "web-02"])),
                ("firewall/policy", Self::policy(1, "lan-to-wan")),
                ("firewall/policy", Self::policy(2, "web-inbound")),
                ("firewall/policy", Self::policy(3, "deny-all")),
            ],
            singletons: vec![("system/dns", Self::dns())],
            empty_tables: vec![
                "router/static",
                "switch-controller/managed-switch",
                "endpoint-control/fctems",
            ],
        }
    }
}
