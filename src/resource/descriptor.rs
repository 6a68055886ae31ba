//! Declarative per-resource metadata.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::normalize::TableFieldSpec;

/// API surface a resource lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiCategory {
    /// Configuration objects (`api/v2/cmdb`).
    Cmdb,
    /// Status and statistics (`api/v2/monitor`).
    Monitor,
}

impl ApiCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiCategory::Cmdb => "cmdb",
            ApiCategory::Monitor => "monitor",
        }
    }
}

impl fmt::Display for ApiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a resource's identity key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MkeyKind {
    String,
    Integer,
}

/// Write operations a resource may support. Reads are always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Create,
    Update,
    Delete,
    Move,
    Clone,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Update => "update",
            Capability::Delete => "delete",
            Capability::Move => "move",
            Capability::Clone => "clone",
        }
    }
}

/// Value shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text, optionally length-limited.
    Text { max_len: Option<usize> },
    /// Bounded integer.
    Integer { min: i64, max: i64 },
    /// One of a fixed set of keywords.
    Choice { options: &'static [&'static str] },
    /// IP address, `ip mask` pair or prefix.
    Address,
    /// Sub-table of keyed entries.
    Table,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text { max_len: Some(max) } => write!(f, "string, max {max}"),
            FieldKind::Text { max_len: None } => f.write_str("string"),
            FieldKind::Integer { min, max } => write!(f, "integer, {min}..={max}"),
            FieldKind::Choice { options } => write!(f, "one of {}", options.join("|")),
            FieldKind::Address => f.write_str("address"),
            FieldKind::Table => f.write_str("table"),
        }
    }
}

/// Static metadata for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Wire name (`associated-interface`).
    pub name: &'static str,
    pub kind: FieldKind,
    pub help: &'static str,
    pub default: Option<&'static str>,
    pub required: bool,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind, help: &'static str) -> Self {
        Self {
            name,
            kind,
            help,
            default: None,
            required: false,
        }
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// Check an explicitly provided value against this field's constraints.
    ///
    /// Only values of the expected JSON type are checked; anything else is
    /// left for the device to reject.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        match (self.kind, value) {
            (FieldKind::Choice { options }, Value::String(s)) if !options.contains(&s.as_str()) => {
                Err(ValidationError::InvalidOption {
                    field: self.name.to_string(),
                    value: s.clone(),
                    options: options.iter().map(|o| o.to_string()).collect(),
                })
            }
            (FieldKind::Integer { min, max }, Value::Number(n)) => match n.as_i64() {
                Some(v) if v < min || v > max => Err(ValidationError::ValueOutOfRange {
                    field: self.name.to_string(),
                    value: v,
                    min,
                    max,
                }),
                _ => Ok(()),
            },
            (FieldKind::Text { max_len: Some(max) }, Value::String(s)) if s.chars().count() > max => {
                Err(ValidationError::ValueTooLong {
                    field: self.name.to_string(),
                    len: s.chars().count(),
                    max,
                })
            }
            _ => Ok(()),
        }
    }

    /// Default as a JSON value, typed by the field kind.
    pub fn default_value(&self) -> Option<Value> {
        let raw = self.default?;
        match self.kind {
            FieldKind::Integer { .. } => Some(
                raw.parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::from(raw)),
            ),
            _ => Some(Value::from(raw)),
        }
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.kind, self.help)?;
        if self.required {
            f.write_str(" [required]")?;
        }
        if let Some(default) = self.default {
            write!(f, " [default: {default}]")?;
        }
        Ok(())
    }
}

/// Everything the generic client needs to know about one resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceDescriptor {
    pub category: ApiCategory,
    /// Path below the category (`firewall/address`).
    pub path: &'static str,
    /// Identity key; `None` for singleton objects such as `system/dns`.
    pub mkey: Option<&'static str>,
    pub mkey_kind: MkeyKind,
    pub help: &'static str,
    pub fields: &'static [FieldSpec],
    pub table_fields: &'static [TableFieldSpec],
    pub capabilities: &'static [Capability],
}

impl ResourceDescriptor {
    /// Collection path relative to the API root.
    pub fn api_path(&self) -> String {
        format!("api/v2/{}/{}", self.category, self.path)
    }

    /// Object path with a percent-encoded identifier.
    pub fn object_path(&self, mkey: &str) -> String {
        format!("{}/{}", self.api_path(), urlencoding::encode(mkey))
    }

    pub fn is_singleton(&self) -> bool {
        self.mkey.is_none()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn table_field(&self, name: &str) -> Option<&'static TableFieldSpec> {
        self.table_fields.iter().find(|t| t.name == name)
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect()
    }

    /// Field defaults as a payload-shaped map.
    pub fn defaults(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter_map(|f| f.default_value().map(|v| (f.name.to_string(), v)))
            .collect()
    }

    /// Human-readable help for one field.
    pub fn describe(&self, name: &str) -> Option<String> {
        let spec = self.field(name)?;
        let mut text = spec.to_string();
        if let Some(table) = self.table_field(name) {
            text.push_str(&format!(
                "\n  entries keyed by '{}', example: {}",
                table.mkey, table.example
            ));
        }
        Some(text)
    }

    /// The descriptor as JSON.
    pub fn schema(&self) -> Value {
        serde_json::to_value(self).unwrap_or(serde_json::json!({}))
    }

    /// Identity value from a built payload.
    pub fn identity<'p>(&self, payload: &'p Map<String, Value>) -> Result<&'p Value, ValidationError> {
        let field = self.mkey.ok_or_else(|| ValidationError::Unsupported {
            operation: "addressing by identifier",
            resource: self.path.to_string(),
        })?;
        payload
            .get(field)
            .filter(|value| mkey_segment(value).is_some())
            .ok_or_else(|| ValidationError::MissingIdentity {
                resource: self.path.to_string(),
                field: field.to_string(),
            })
    }

    /// Interpret command-line text as an identifier of the right type.
    pub fn parse_mkey(&self, raw: &str) -> Value {
        match self.mkey_kind {
            MkeyKind::Integer => raw
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::from(raw)),
            MkeyKind::String => Value::from(raw),
        }
    }
}

/// Path segment for an identifier, if it is usable as one.
///
/// Non-empty strings and numbers qualify; everything else does not.
pub fn mkey_segment(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static WIDGET: ResourceDescriptor = ResourceDescriptor {
        category: ApiCategory::Cmdb,
        path: "test/widget",
        mkey: Some("name"),
        mkey_kind: MkeyKind::String,
        help: "Test widget.",
        fields: &[
            FieldSpec {
                name: "name",
                kind: FieldKind::Text { max_len: Some(8) },
                help: "Widget name.",
                default: None,
                required: true,
            },
            FieldSpec {
                name: "mode",
                kind: FieldKind::Choice {
                    options: &["fast", "slow"],
                },
                help: "Mode.",
                default: Some("fast"),
                required: false,
            },
            FieldSpec {
                name: "weight",
                kind: FieldKind::Integer { min: 1, max: 10 },
                help: "Weight.",
                default: Some("5"),
                required: false,
            },
            FieldSpec {
                name: "parts",
                kind: FieldKind::Table,
                help: "Parts.",
                default: None,
                required: false,
            },
        ],
        table_fields: &[TableFieldSpec {
            name: "parts",
            mkey: "id",
            required: &["id"],
            example: "[{\"id\": 1}]",
        }],
        capabilities: &[Capability::Create, Capability::Update],
    };

    #[test]
    fn test_paths() {
        assert_eq!(WIDGET.api_path(), "api/v2/cmdb/test/widget");
        assert_eq!(
            WIDGET.object_path("10.0.0.0/24"),
            "api/v2/cmdb/test/widget/10.0.0.0%2F24"
        );
    }

    #[test]
    fn test_metadata_accessors() {
        assert_eq!(WIDGET.field_names(), vec!["name", "mode", "weight", "parts"]);
        assert_eq!(WIDGET.required_fields(), vec!["name"]);
        assert_eq!(
            Value::Object(WIDGET.defaults()),
            json!({"mode": "fast", "weight": 5})
        );
        assert!(WIDGET.supports(Capability::Create));
        assert!(!WIDGET.supports(Capability::Move));

        let help = WIDGET.describe("parts").unwrap();
        assert!(help.contains("keyed by 'id'"));
        assert!(WIDGET.describe("missing").is_none());

        let schema = WIDGET.schema();
        assert_eq!(schema["path"], "test/widget");
        assert_eq!(schema["fields"][1]["kind"]["type"], "choice");
    }

    #[test]
    fn test_field_validation() {
        let mode = WIDGET.field("mode").unwrap();
        assert!(mode.validate(&json!("slow")).is_ok());
        assert!(matches!(
            mode.validate(&json!("warp")),
            Err(ValidationError::InvalidOption { .. })
        ));

        let weight = WIDGET.field("weight").unwrap();
        assert!(weight.validate(&json!(10)).is_ok());
        assert!(matches!(
            weight.validate(&json!(11)),
            Err(ValidationError::ValueOutOfRange { value: 11, .. })
        ));

        let name = WIDGET.field("name").unwrap();
        assert!(matches!(
            name.validate(&json!("much-too-long")),
            Err(ValidationError::ValueTooLong { max: 8, .. })
        ));
    }

    #[test]
    fn test_identity() {
        let payload = json!({"name": "w1"});
        assert_eq!(
            WIDGET.identity(payload.as_object().unwrap()).unwrap(),
            &json!("w1")
        );

        for payload in [json!({}), json!({"name": ""}), json!({"name": null})] {
            assert!(matches!(
                WIDGET.identity(payload.as_object().unwrap()),
                Err(ValidationError::MissingIdentity { .. })
            ));
        }
    }

    #[test]
    fn test_mkey_segment() {
        assert_eq!(mkey_segment(&json!("web")), Some("web".to_string()));
        assert_eq!(mkey_segment(&json!(42)), Some("42".to_string()));
        assert_eq!(mkey_segment(&json!("")), None);
        assert_eq!(mkey_segment(&json!(true)), None);
    }
}
