//! `firewall/*` descriptors.

use crate::normalize::TableFieldSpec;
use crate::resource::{ApiCategory, Capability, FieldKind, FieldSpec, MkeyKind, ResourceDescriptor};

const ENABLE_DISABLE: FieldKind = FieldKind::Choice {
    options: &["enable", "disable"],
};

const NAME: FieldKind = FieldKind::Text { max_len: Some(79) };

const COMMENT: FieldKind = FieldKind::Text {
    max_len: Some(255),
};

const ALL_WRITES: &[Capability] = &[
    Capability::Create,
    Capability::Update,
    Capability::Delete,
    Capability::Move,
    Capability::Clone,
];

const fn named(field: &'static str) -> TableFieldSpec {
    TableFieldSpec {
        name: field,
        mkey: "name",
        required: &["name"],
        example: "[{\"name\": \"all\"}]",
    }
}

/// IPv4 address objects.
pub static FIREWALL_ADDRESS: ResourceDescriptor = ResourceDescriptor {
    category: ApiCategory::Cmdb,
    path: "firewall/address",
    mkey: Some("name"),
    mkey_kind: MkeyKind::String,
    help: "Configure IPv4 addresses.",
    fields: &[
        FieldSpec::new("name", NAME, "Address name.").required(),
        FieldSpec::new(
            "type",
            FieldKind::Choice {
                options: &[
                    "ipmask",
                    "iprange",
                    "fqdn",
                    "geography",
                    "wildcard",
                    "dynamic",
                    "interface-subnet",
                    "mac",
                ],
            },
            "Type of address.",
        )
        .with_default("ipmask"),
        FieldSpec::new("subnet", FieldKind::Address, "IP address and subnet mask of address.")
            .with_default("0.0.0.0 0.0.0.0"),
        FieldSpec::new("start-ip", FieldKind::Address, "First IP address (inclusive) in the range."),
        FieldSpec::new("end-ip", FieldKind::Address, "Final IP address (inclusive) in the range."),
        FieldSpec::new(
            "fqdn",
            FieldKind::Text { max_len: Some(255) },
            "Fully Qualified Domain Name address.",
        ),
        FieldSpec::new(
            "country",
            FieldKind::Text { max_len: Some(2) },
            "IP addresses associated to a specific country.",
        ),
        FieldSpec::new(
            "associated-interface",
            FieldKind::Text { max_len: Some(35) },
            "Network interface associated with address.",
        ),
        FieldSpec::new("macaddr", FieldKind::Table, "Multiple MAC address ranges."),
        FieldSpec::new("comment", COMMENT, "Comment."),
        FieldSpec::new("visibility", ENABLE_DISABLE, "Enable/disable address visibility.")
            .with_default("enable"),
        FieldSpec::new(
            "color",
            FieldKind::Integer { min: 0, max: 32 },
            "Color of icon on the GUI.",
        )
        .with_default("0"),
    ],
    table_fields: &[TableFieldSpec {
        name: "macaddr",
        mkey: "macaddr",
        required: &["macaddr"],
        example: "[{\"macaddr\": \"00:11:22:33:44:55\"}]",
    }],
    capabilities: ALL_WRITES,
};

/// IPv4 address groups.
pub static FIREWALL_ADDRGRP: ResourceDescriptor = ResourceDescriptor {
    category: ApiCategory::Cmdb,
    path: "firewall/addrgrp",
    mkey: Some("name"),
    mkey_kind: MkeyKind::String,
    help: "Configure IPv4 address groups.",
    fields: &[
        FieldSpec::new("name", NAME, "Address group name.").required(),
        FieldSpec::new(
            "type",
            FieldKind::Choice {
                options: &["default", "folder"],
            },
            "Address group type.",
        )
        .with_default("default"),
        FieldSpec::new("member", FieldKind::Table, "Address objects contained within the group.")
            .required(),
        FieldSpec::new("exclude", ENABLE_DISABLE, "Enable/disable address exclusion.")
            .with_default("disable"),
        FieldSpec::new("exclude-member", FieldKind::Table, "Address exclusion member."),
        FieldSpec::new("comment", COMMENT, "Comment."),
    ],
    table_fields: &[named("member"), named("exclude-member")],
    capabilities: ALL_WRITES,
};

/// IPv4 and IPv6 policies, keyed by `policyid`.
pub static FIREWALL_POLICY: ResourceDescriptor = ResourceDescriptor {
    category: ApiCategory::Cmdb,
    path: "firewall/policy",
    mkey: Some("policyid"),
    mkey_kind: MkeyKind::Integer,
    help: "Configure IPv4/IPv6 policies.",
    fields: &[
        FieldSpec::new(
            "policyid",
            FieldKind::Integer {
                min: 0,
                max: 4_294_967_294,
            },
            "Policy ID (0 lets the device assign one).",
        )
        .required(),
        FieldSpec::new("name", FieldKind::Text { max_len: Some(35) }, "Policy name."),
        FieldSpec::new("srcintf", FieldKind::Table, "Incoming (ingress) interface.").required(),
        FieldSpec::new("dstintf", FieldKind::Table, "Outgoing (egress) interface.").required(),
        FieldSpec::new("srcaddr", FieldKind::Table, "Source IPv4 address and address group names."),
        FieldSpec::new(
            "dstaddr",
            FieldKind::Table,
            "Destination IPv4 address and address group names.",
        ),
        FieldSpec::new("service", FieldKind::Table, "Service and service group names."),
        FieldSpec::new(
            "action",
            FieldKind::Choice {
                options: &["accept", "deny", "ipsec"],
            },
            "Policy action.",
        )
        .with_default("deny"),
        FieldSpec::new("status", ENABLE_DISABLE, "Enable or disable this policy.")
            .with_default("enable"),
        FieldSpec::new("schedule", FieldKind::Text { max_len: Some(35) }, "Schedule name.")
            .with_default("always"),
        FieldSpec::new("nat", ENABLE_DISABLE, "Enable/disable source NAT.").with_default("disable"),
        FieldSpec::new(
            "logtraffic",
            FieldKind::Choice {
                options: &["all", "utm", "disable"],
            },
            "Enable or disable logging.",
        )
        .with_default("utm"),
        FieldSpec::new("comments", FieldKind::Text { max_len: Some(1023) }, "Comment."),
    ],
    table_fields: &[
        named("srcintf"),
        named("dstintf"),
        named("srcaddr"),
        named("dstaddr"),
        named("service"),
    ],
    capabilities: ALL_WRITES,
};
