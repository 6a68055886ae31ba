//! MCP tool parameter types with JSON Schema support.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Scope;

/// Scope selection shared by every tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ScopeParams {
    /// VDOM to target. Defaults to the server's configured VDOM.
    #[serde(default)]
    pub vdom: Option<String>,
    /// Target the global scope instead of a VDOM.
    #[serde(default)]
    pub global: bool,
}

impl ScopeParams {
    pub fn scope(&self) -> Scope {
        match (&self.vdom, self.global) {
            (_, true) => Scope::Global,
            (Some(vdom), false) => Scope::vdom(vdom.clone()),
            (None, false) => Scope::Default,
        }
    }
}

/// Parameters for the `get` MCP tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetParams {
    /// Resource path, e.g. `firewall/address`.
    pub resource: String,
    /// Object key. Omit to read the collection.
    #[serde(default)]
    pub mkey: Option<String>,
    /// Filters in FortiOS syntax (`name==web`), combined with AND.
    #[serde(default)]
    pub filter: Vec<String>,
    /// Attributes to return.
    #[serde(default)]
    pub format: Vec<String>,
    /// Offset of the first object (0-indexed).
    #[serde(default)]
    pub start: Option<u32>,
    /// Number of objects to return (max 1000).
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(flatten)]
    pub scope: ScopeParams,
}

/// Parameters for the `set` MCP tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SetParams {
    /// Resource path, e.g. `firewall/policy`.
    pub resource: String,
    /// Object attributes, including the key. Sub-table fields accept a
    /// name, a list of names, or a list of objects.
    pub data: Map<String, Value>,
    #[serde(flatten)]
    pub scope: ScopeParams,
}

/// Parameters for the `delete` MCP tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteParams {
    /// Resource path.
    pub resource: String,
    /// Key of the object to delete.
    pub mkey: String,
    #[serde(flatten)]
    pub scope: ScopeParams,
}

/// Parameters for the `move` MCP tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MoveParams {
    /// Resource path, e.g. `firewall/policy`.
    pub resource: String,
    /// Key of the object to move.
    pub mkey: String,
    /// `top`, `bottom`, `before`, `after`, or a 1-based slot number.
    pub position: String,
    /// Reference key, required for `before` and `after`.
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(flatten)]
    pub scope: ScopeParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_params_schema_generates() {
        let schema = schemars::schema_for!(GetParams);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("resource"));
        assert!(json.contains("mkey"));
        assert!(json.contains("filter"));
        assert!(json.contains("vdom"));
    }

    #[test]
    fn move_params_schema_generates() {
        let schema = schemars::schema_for!(MoveParams);
        let json = serde_json::to_string(&schema).unwrap();
        assert!(json.contains("position"));
        assert!(json.contains("reference"));
    }

    #[test]
    fn get_params_deserializes_with_defaults() {
        let json = r#"{"resource": "firewall/address"}"#;
        let params: GetParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.resource, "firewall/address");
        assert!(params.mkey.is_none());
        assert!(params.filter.is_empty());
        assert_eq!(params.scope.scope(), Scope::Default);
    }

    #[test]
    fn scope_params_flatten() {
        let json = r#"{"resource": "firewall/address", "mkey": "web", "vdom": "dmz"}"#;
        let params: DeleteParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.scope.scope(), Scope::vdom("dmz"));

        let json = r#"{"resource": "system/dns", "data": {}, "global": true}"#;
        let params: SetParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.scope.scope(), Scope::Global);
    }

    #[test]
    fn set_params_requires_object_data() {
        let json = r#"{"resource": "firewall/address", "data": "web"}"#;
        assert!(serde_json::from_str::<SetParams>(json).is_err());
    }
}
