//! MCP Server handler for the FortiOS API.

use rmcp::{
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, ErrorData as McpError, Implementation,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
        ToolsCapability,
    },
    service::RequestContext,
    RoleServer,
};
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;

use crate::{
    mcp::{DeleteParams, GetParams, MoveParams, ScopeParams, SetParams},
    resources, Fields, FortiClient, FortiError, GetQuery, MovePosition, ResourceClient, DEFAULT_PAGE_SIZE,
};

/// FortiOS MCP Server.
///
/// # Tools
///
/// - `get` - Read a collection or one object
/// - `set` - Create or update an object
/// - `delete` - Delete an object
/// - `move` - Reposition an object in an ordered table
#[derive(Clone)]
pub struct FortiServer {
    client: Arc<FortiClient>,
}

impl FortiServer {
    /// Create a new FortiServer from `FORTIOS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `FORTIOS_HOST` or `FORTIOS_TOKEN` is not set.
    pub fn from_env() -> crate::Result<Self> {
        let client = FortiClient::from_env()?;
        Ok(Self::new(client))
    }

    /// Create a new FortiServer with an existing client.
    pub fn new(client: FortiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Generate JSON Schema for a type.
    fn schema<T: JsonSchema>() -> Arc<serde_json::Map<String, serde_json::Value>> {
        let schema = schemars::schema_for!(T);
        let value = serde_json::to_value(&schema).unwrap_or(serde_json::json!({}));
        match value {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        }
    }

    /// Convert FortiError to McpError.
    fn to_mcp_error(err: FortiError) -> McpError {
        match &err {
            FortiError::NotFound { path } => {
                McpError::resource_not_found(format!("'{path}' not found"), None)
            }
            FortiError::ConfigMissing(_)
            | FortiError::UnknownResource(_)
            | FortiError::Validation(_) => McpError::invalid_params(err.to_string(), None),
            _ => McpError::internal_error(err.to_string(), None),
        }
    }

    fn to_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    fn bind(
        &self,
        resource: &str,
        scope: &ScopeParams,
    ) -> Result<ResourceClient<'_, FortiClient>, McpError> {
        let descriptor = resources::lookup(resource).map_err(Self::to_mcp_error)?;
        Ok(self.client.resource(descriptor).with_scope(scope.scope()))
    }

    /// Handle the `get` tool.
    pub async fn handle_get(&self, params: GetParams) -> Result<CallToolResult, McpError> {
        let resource = self.bind(&params.resource, &params.scope)?;
        let query = GetQuery {
            mkey: params
                .mkey
                .as_deref()
                .map(|m| resource.descriptor().parse_mkey(m)),
            filter: (!params.filter.is_empty()).then(|| params.filter.into()),
            format: params.format,
            start: params.start,
            count: params.count.map(|c| c.min(DEFAULT_PAGE_SIZE)),
            ..Default::default()
        };

        let response = resource.get(&query).await.map_err(Self::to_mcp_error)?;
        Self::to_result(&response.results)
    }

    /// Handle the `set` tool.
    pub async fn handle_set(&self, params: SetParams) -> Result<CallToolResult, McpError> {
        let resource = self.bind(&params.resource, &params.scope)?;
        let fields = params
            .data
            .into_iter()
            .fold(Fields::new(), |fields, (name, value)| fields.set(name, value));
        let response = resource.set(&fields).await.map_err(Self::to_mcp_error)?;
        Self::to_result(&response)
    }

    /// Handle the `delete` tool.
    pub async fn handle_delete(&self, params: DeleteParams) -> Result<CallToolResult, McpError> {
        let resource = self.bind(&params.resource, &params.scope)?;
        let mkey = resource.descriptor().parse_mkey(&params.mkey);
        let response = resource.delete(&mkey).await.map_err(Self::to_mcp_error)?;
        Self::to_result(&response)
    }

    /// Handle the `move` tool.
    pub async fn handle_move(&self, params: MoveParams) -> Result<CallToolResult, McpError> {
        let position: MovePosition = params
            .position
            .parse()
            .map_err(|e: String| McpError::invalid_params(e, None))?;
        let resource = self.bind(&params.resource, &params.scope)?;
        let descriptor = resource.descriptor();

        let response = resource
            .move_to(
                descriptor.parse_mkey(&params.mkey),
                position,
                params.reference.as_deref().map(|r| descriptor.parse_mkey(r)),
            )
            .await
            .map_err(Self::to_mcp_error)?;
        Self::to_result(&response)
    }
}

impl ServerHandler for FortiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "fortiapi".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(
                "FortiOS API MCP Server - Read and change FortiGate configuration objects."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: PaginatedRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let known = resources::ALL
            .iter()
            .map(|d| d.path)
            .collect::<Vec<_>>()
            .join(", ");

        let tools = vec![
            Tool::new(
                "get",
                format!(
                    "Read FortiOS configuration. Without mkey, returns the collection \
                     (filters use FortiOS syntax such as name==web). Resources: {known}."
                ),
                Self::schema::<GetParams>(),
            ),
            Tool::new(
                "set",
                "Create or update a FortiOS object. The object is updated if its key \
                 already exists and created otherwise. Singleton resources are always updated.",
                Self::schema::<SetParams>(),
            ),
            Tool::new(
                "delete",
                "Delete a FortiOS object by key.",
                Self::schema::<DeleteParams>(),
            ),
            Tool::new(
                "move",
                "Move an object in an ordered table such as firewall/policy. \
                 Position is top, bottom, a 1-based slot, or before/after with a reference key.",
                Self::schema::<MoveParams>(),
            ),
        ];

        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let args = request
            .arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::json!({}));

        match request.name.as_ref() {
            "get" => {
                let params: GetParams = serde_json::from_value(args)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                self.handle_get(params).await
            }
            "set" => {
                let params: SetParams = serde_json::from_value(args)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                self.handle_set(params).await
            }
            "delete" => {
                let params: DeleteParams = serde_json::from_value(args)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                self.handle_delete(params).await
            }
            "move" => {
                let params: MoveParams = serde_json::from_value(args)
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                self.handle_move(params).await
            }
            other => Err(McpError::invalid_params(
                format!("Unknown tool: {other}"),
                None,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn text(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            rmcp::model::RawContent::Text(t) => &t.text,
            _ => panic!("Expected text content"),
        }
    }

    async fn server_for(mock_server: &MockServer) -> FortiServer {
        let client = FortiClient::new("test-token", &mock_server.uri()).unwrap();
        FortiServer::new(client)
    }

    #[test]
    fn schema_generates_for_all_params() {
        assert!(!FortiServer::schema::<GetParams>().is_empty());
        assert!(!FortiServer::schema::<SetParams>().is_empty());
        assert!(!FortiServer::schema::<DeleteParams>().is_empty());
        assert!(!FortiServer::schema::<MoveParams>().is_empty());
    }

    #[test]
    fn server_implements_handler() {
        // This compiles only if FortiServer implements ServerHandler correctly.
        fn assert_server_handler<T: ServerHandler>() {}
        assert_server_handler::<FortiServer>();
    }

    #[tokio::test]
    async fn handle_get_returns_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/cmdb/firewall/address"))
            .and(query_param("filter", "type==fqdn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "http_status": 200,
                "results": [{"name": "corp", "type": "fqdn", "fqdn": "corp.example.com"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server).await;
        let params: GetParams = serde_json::from_value(json!({
            "resource": "firewall/address",
            "filter": ["type==fqdn"]
        }))
        .unwrap();

        let result = server.handle_get(params).await.unwrap();
        assert!(!result.is_error.unwrap_or(false));

        let results: serde_json::Value = serde_json::from_str(text(&result)).unwrap();
        assert_eq!(results[0]["name"], "corp");
    }

    #[tokio::test]
    async fn handle_set_creates_when_missing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v2/cmdb/firewall/addrgrp/web"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": "error",
                "http_status": 404
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/v2/cmdb/firewall/addrgrp"))
            .and(body_json(json!({
                "name": "web",
                "member": [{"name": "web-01"}, {"name": "web-02"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "http_status": 200,
                "mkey": "web"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server).await;
        let params: SetParams = serde_json::from_value(json!({
            "resource": "firewall/addrgrp",
            "data": {"name": "web", "member": ["web-01", "web-02"]}
        }))
        .unwrap();

        let result = server.handle_set(params).await.unwrap();
        assert!(text(&result).contains("\"mkey\": \"web\""));
    }

    #[tokio::test]
    async fn handle_move_rejects_bad_position() {
        let mock_server = MockServer::start().await;
        let server = server_for(&mock_server).await;

        let params: MoveParams = serde_json::from_value(json!({
            "resource": "firewall/policy",
            "mkey": "7",
            "position": "middle"
        }))
        .unwrap();

        let err = server.handle_move(params).await.unwrap_err();
        assert!(err.message.contains("invalid position"));
    }

    #[tokio::test]
    async fn handle_delete_unknown_resource_is_invalid_params() {
        let mock_server = MockServer::start().await;
        let server = server_for(&mock_server).await;

        let params: DeleteParams = serde_json::from_value(json!({
            "resource": "firewall/nope",
            "mkey": "x"
        }))
        .unwrap();

        let err = server.handle_delete(params).await.unwrap_err();
        assert!(err.message.contains("Unknown resource"));
    }
}
