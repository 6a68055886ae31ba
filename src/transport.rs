//! Transport abstraction between resource clients and the device.
//!
//! [`ResourceClient`](crate::ResourceClient) only ever talks to a
//! [`Transport`]; [`FortiClient`](crate::FortiClient) is the HTTP
//! implementation, and tests inject their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// FortiOS error code for "entry not found".
pub const NOT_FOUND_ERROR_CODE: i64 = -3;

/// Configuration partition a request targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Let the transport decide (its configured default VDOM, if any).
    #[default]
    Default,
    /// Global configuration (`global=1`).
    Global,
    /// A named virtual domain (`vdom=<name>`).
    Vdom(String),
}

impl Scope {
    /// Scope a request to a named VDOM.
    pub fn vdom(name: impl Into<String>) -> Self {
        Scope::Vdom(name.into())
    }

    /// Add the scope's query pair, falling back to `default_vdom` for
    /// [`Scope::Default`].
    pub fn apply(&self, params: &mut QueryParams, default_vdom: Option<&str>) {
        match self {
            Scope::Default => {
                if let Some(vdom) = default_vdom {
                    params.push("vdom", vdom);
                }
            }
            Scope::Global => params.push("global", "1"),
            Scope::Vdom(vdom) => params.push("vdom", vdom),
        }
    }
}

/// Ordered query pairs. Keys may repeat (`filter` does).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend(&mut self, other: &QueryParams) {
        self.0.extend(other.0.iter().cloned());
    }
}

/// The FortiOS REST response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_method: Option<String>,

    /// Object list, single object, or nothing, depending on the call.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub results: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vdom: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Identity of the object a write touched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mkey: Option<Value>,

    /// `"success"` or `"error"`.
    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,

    /// FortiOS internal error code (negative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<u64>,
}

impl ApiResponse {
    /// A bare success envelope.
    pub fn success(results: Value) -> Self {
        Self {
            results,
            status: "success".to_string(),
            http_status: Some(200),
            ..Default::default()
        }
    }

    /// Whether the device reported success.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Whether the envelope describes a missing object.
    pub fn is_not_found(&self) -> bool {
        !self.is_success()
            && (self.http_status == Some(404) || self.error == Some(NOT_FOUND_ERROR_CODE))
    }

    /// Results as a list: arrays as-is, a lone object as one entry.
    pub fn entries(&self) -> Vec<&Value> {
        match &self.results {
            Value::Array(items) => items.iter().collect(),
            Value::Null => Vec::new(),
            other => vec![other],
        }
    }

    /// Owned variant of [`entries`](Self::entries).
    pub fn into_entries(self) -> Vec<Value> {
        match self.results {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        }
    }
}

/// The four HTTP verbs the resource layer needs.
///
/// `path` is relative to the API root (`api/v2/cmdb/firewall/address`).
/// Implementations classify "not found" at this boundary and return
/// [`FortiError::NotFound`](crate::FortiError::NotFound), so callers never
/// inspect status codes or messages.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, params: &QueryParams, scope: &Scope) -> Result<ApiResponse>;

    async fn post(
        &self,
        path: &str,
        body: &Value,
        params: &QueryParams,
        scope: &Scope,
    ) -> Result<ApiResponse>;

    async fn put(
        &self,
        path: &str,
        body: &Value,
        params: &QueryParams,
        scope: &Scope,
    ) -> Result<ApiResponse>;

    async fn delete(&self, path: &str, params: &QueryParams, scope: &Scope)
        -> Result<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_apply() {
        let mut params = QueryParams::new();
        Scope::Default.apply(&mut params, None);
        assert!(params.is_empty());

        Scope::Default.apply(&mut params, Some("root"));
        assert_eq!(params.get("vdom"), Some("root"));

        let mut params = QueryParams::new();
        Scope::Global.apply(&mut params, Some("root"));
        assert_eq!(params.get("global"), Some("1"));
        assert_eq!(params.get("vdom"), None);

        let mut params = QueryParams::new();
        Scope::vdom("dmz").apply(&mut params, Some("root"));
        assert_eq!(params.get_all("vdom"), vec!["dmz"]);
    }

    #[test]
    fn test_response_envelope_parses() {
        let response: ApiResponse = serde_json::from_value(json!({
            "http_method": "GET",
            "results": [{"name": "web", "subnet": "10.0.0.1 255.255.255.255"}],
            "vdom": "root",
            "path": "firewall",
            "name": "address",
            "status": "success",
            "http_status": 200,
            "serial": "FGVM00000000000",
            "version": "v7.4.3",
            "build": 2573
        }))
        .unwrap();

        assert!(response.is_success());
        assert_eq!(response.entries().len(), 1);
        assert_eq!(response.entries()[0]["name"], "web");
    }

    #[test]
    fn test_not_found_envelope() {
        let response: ApiResponse = serde_json::from_value(json!({
            "status": "error",
            "http_status": 404
        }))
        .unwrap();
        assert!(response.is_not_found());

        let response: ApiResponse = serde_json::from_value(json!({
            "status": "error",
            "error": -3
        }))
        .unwrap();
        assert!(response.is_not_found());

        let response: ApiResponse = serde_json::from_value(json!({
            "status": "error",
            "http_status": 500,
            "error": -5
        }))
        .unwrap();
        assert!(!response.is_not_found());
    }

    #[test]
    fn test_single_object_results_become_one_entry() {
        let response = ApiResponse::success(json!({"primary": "8.8.8.8"}));
        assert_eq!(response.entries().len(), 1);
        assert_eq!(response.into_entries()[0]["primary"], "8.8.8.8");
    }
}
