//! `system/*` descriptors, configuration and monitor.

use crate::normalize::TableFieldSpec;
use crate::resource::{ApiCategory, Capability, FieldKind, FieldSpec, MkeyKind, ResourceDescriptor};

/// DNS settings. A singleton: there is exactly one object, addressed by
/// the collection path.
pub static SYSTEM_DNS: ResourceDescriptor = ResourceDescriptor {
    category: ApiCategory::Cmdb,
    path: "system/dns",
    mkey: None,
    mkey_kind: MkeyKind::String,
    help: "Configure DNS.",
    fields: &[
        FieldSpec::new("primary", FieldKind::Address, "Primary DNS server IP address.")
            .with_default("96.45.45.45"),
        FieldSpec::new("secondary", FieldKind::Address, "Secondary DNS server IP address.")
            .with_default("96.45.46.46"),
        FieldSpec::new(
            "protocol",
            FieldKind::Choice {
                options: &["cleartext", "dot", "doh"],
            },
            "DNS transport protocols.",
        )
        .with_default("cleartext"),
        FieldSpec::new("domain", FieldKind::Table, "Search suffix list for hostname lookup."),
        FieldSpec::new(
            "timeout",
            FieldKind::Integer { min: 1, max: 10 },
            "DNS query timeout interval in seconds.",
        )
        .with_default("5"),
        FieldSpec::new(
            "retry",
            FieldKind::Integer { min: 0, max: 5 },
            "Number of times to retry.",
        )
        .with_default("2"),
    ],
    table_fields: &[TableFieldSpec {
        name: "domain",
        mkey: "domain",
        required: &["domain"],
        example: "[{\"domain\": \"example.com\"}]",
    }],
    capabilities: &[Capability::Update],
};

/// Read-only system status.
pub static MONITOR_SYSTEM_STATUS: ResourceDescriptor = ResourceDescriptor {
    category: ApiCategory::Monitor,
    path: "system/status",
    mkey: None,
    mkey_kind: MkeyKind::String,
    help: "Retrieve basic system status.",
    fields: &[],
    table_fields: &[],
    capabilities: &[],
};
