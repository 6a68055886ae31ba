use crate::normalize::TableFieldSpec;
use crate::resource::{ApiCategory, Capability, FieldKind, FieldSpec, MkeyKind, ResourceDescriptor};

/// Static IPv4 routes, keyed by sequence number.
pub static ROUTER_STATIC: ResourceDescriptor = ResourceDescriptor {
    category: ApiCategory::Cmdb,
    path: "router/static",
    mkey: Some("seq-num"),
    mkey_kind: MkeyKind::Integer,
    help: "Configure IPv4 static routing tables.",
    fields: &[
        FieldSpec::new(
            "seq-num",
            FieldKind::Integer {
                min: 0,
                max: 4_294_967_295,
            },
            "Sequence number.",
        )
        .required(),
        FieldSpec::new(
            "status",
            FieldKind::Choice {
                options: &["enable", "disable"],
            },
            "Enable/disable this static route.",
        )
        .with_default("enable"),
        FieldSpec::new("dst", FieldKind::Address, "Destination IP and mask for this route.")
            .with_default("0.0.0.0 0.0.0.0"),
        FieldSpec::new("gateway", FieldKind::Address, "Gateway IP for this route.")
            .with_default("0.0.0.0"),
        FieldSpec::new(
            "device",
            FieldKind::Text { max_len: Some(35) },
            "Gateway out interface or tunnel.",
        ),
        FieldSpec::new(
            "distance",
            FieldKind::Integer { min: 1, max: 255 },
            "Administrative distance.",
        )
        .with_default("10"),
        FieldSpec::new(
            "priority",
            FieldKind::Integer {
                min: 1,
                max: 65535,
            },
            "Administrative priority.",
        )
        .with_default("1"),
        FieldSpec::new("comment", FieldKind::Text { max_len: Some(255) }, "Optional comments."),
    ],
    table_fields: &[],
    capabilities: &[
        Capability::Create,
        Capability::Update,
        Capability::Delete,
        Capability::Move,
    ],
};

/// FortiSwitches managed by the controller.
pub static SWITCH_CONTROLLER_MANAGED_SWITCH: ResourceDescriptor = ResourceDescriptor {
    category: ApiCategory::Cmdb,
    path: "switch-controller/managed-switch",
    mkey: Some("switch-id"),
    mkey_kind: MkeyKind::String,
    help: "Configure FortiSwitch devices that are managed by this FortiGate.",
    fields: &[
        FieldSpec::new(
            "switch-id",
            FieldKind::Text { max_len: Some(35) },
            "Managed-switch name (serial number).",
        )
        .required(),
        FieldSpec::new("name", FieldKind::Text { max_len: Some(35) }, "Managed-switch name."),
        FieldSpec::new(
            "description",
            FieldKind::Text { max_len: Some(63) },
            "Description.",
        ),
        FieldSpec::new(
            "fsw-wan1-admin",
            FieldKind::Choice {
                options: &["discovered", "disable", "enable"],
            },
            "FortiSwitch WAN1 admin status.",
        )
        .with_default("discovered"),
        FieldSpec::new("ports", FieldKind::Table, "Managed-switch port list."),
    ],
    table_fields: &[TableFieldSpec {
        name: "ports",
        mkey: "port-name",
        required: &["port-name"],
        example: "[{\"port-name\": \"port1\", \"vlan\": \"default\"}]",
    }],
    capabilities: &[Capability::Create, Capability::Update, Capability::Delete],
};

/// FortiClient EMS connectors. The device ships a fixed set of slots.
pub static ENDPOINT_CONTROL_FCTEMS: ResourceDescriptor = ResourceDescriptor {
    category: ApiCategory::Cmdb,
    path: "endpoint-control/fctems",
    mkey: Some("ems-id"),
    mkey_kind: MkeyKind::Integer,
    help: "Configure FortiClient Enterprise Management Server (EMS) entries.",
    fields: &[
        FieldSpec::new(
            "ems-id",
            FieldKind::Integer { min: 1, max: 7 },
            "EMS ID in order.",
        )
        .required(),
        FieldSpec::new(
            "status",
            FieldKind::Choice {
                options: &["enable", "disable"],
            },
            "Enable or disable this EMS configuration.",
        )
        .with_default("disable"),
        FieldSpec::new("name", FieldKind::Text { max_len: Some(35) }, "FortiClient EMS name."),
        FieldSpec::new(
            "server",
            FieldKind::Text { max_len: Some(255) },
            "FortiClient EMS FQDN or IPv4 address.",
        ),
        FieldSpec::new(
            "https-port",
            FieldKind::Integer {
                min: 1,
                max: 65535,
            },
            "FortiClient EMS HTTPS access port number.",
        )
        .with_default("443"),
    ],
    table_fields: &[],
    capabilities: &[Capability::Update],
};
