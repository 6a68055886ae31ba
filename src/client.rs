//! FortiOS API client.
//!
//! Low-level HTTP client that handles authentication, VDOM scoping and the
//! response envelope. Resource operations live on
//! [`ResourceClient`](crate::ResourceClient).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, TlsMode};
use crate::error::{FortiError, Result};
use crate::resource::{ResourceClient, ResourceDescriptor};
use crate::transport::{ApiResponse, QueryParams, Scope, Transport};

const USER_AGENT: &str = concat!("fortiapi/", env!("CARGO_PKG_VERSION"));

/// Low-level FortiOS API client.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use fortiapi::{FortiClient, GetQuery, resources};
///
/// # async fn example() -> fortiapi::Result<()> {
/// // Create from environment variables
/// let client = FortiClient::from_env()?;
///
/// // Or configure manually
/// let client = FortiClient::new("your-api-token", "https://fw.example.com")?;
///
/// let response = client
///     .resource(&resources::FIREWALL_ADDRESS)
///     .get(&GetQuery::default())
///     .await?;
/// println!("{} addresses", response.entries().len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FortiClient {
    http: Client,
    base_url: Arc<Url>,
    token: String,
    vdom: Option<Arc<str>>,
}

impl std::fmt::Debug for FortiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FortiClient")
            .field("base_url", &self.base_url.as_str())
            .field("vdom", &self.vdom)
            .finish_non_exhaustive()
    }
}

impl FortiClient {
    /// Create a client from `FORTIOS_*` environment variables.
    ///
    /// See [`ClientConfig::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if `FORTIOS_HOST` or `FORTIOS_TOKEN` is not set.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a new client with the provided token and host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not a valid URL.
    pub fn new(token: &str, host: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(host, token)?)
    }

    /// Create a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.tls == TlsMode::AcceptInvalid)
            .build()
            .map_err(FortiError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(config.base_url),
            token: config.token,
            vdom: config.vdom.map(Arc::from),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// VDOM used for [`Scope::Default`] requests.
    pub fn default_vdom(&self) -> Option<&str> {
        self.vdom.as_deref()
    }

    /// A resource client bound to this connection.
    pub fn resource(&self, descriptor: &'static ResourceDescriptor) -> ResourceClient<'_, Self> {
        ResourceClient::new(self, descriptor)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        params: &QueryParams,
        scope: &Scope,
    ) -> Result<ApiResponse> {
        let url = self.base_url.join(path)?;

        let mut query = params.clone();
        scope.apply(&mut query, self.default_vdom());

        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(&self.token)
            .query(query.pairs());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(FortiError::HttpError)?;
        Self::check_response(response, path).await
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response, path: &str) -> Result<ApiResponse> {
        let status = response.status();

        // Handle rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(FortiError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        let body = response.text().await.map_err(FortiError::HttpError)?;

        if status.is_success() {
            if body.trim().is_empty() {
                let mut envelope = ApiResponse::success(Value::Null);
                envelope.http_status = Some(status.as_u16());
                return Ok(envelope);
            }
            let envelope: ApiResponse = serde_json::from_str(&body)?;
            if envelope.is_success() || envelope.status.is_empty() {
                return Ok(envelope);
            }
            return Err(Self::classify(Some(envelope), status, &body, path));
        }

        let envelope = serde_json::from_str::<ApiResponse>(&body).ok();
        Err(Self::classify(envelope, status, &body, path))
    }

    /// Turn a failed response into an error. Not-found is decided here and
    /// nowhere else.
    fn classify(
        envelope: Option<ApiResponse>,
        status: StatusCode,
        body: &str,
        path: &str,
    ) -> FortiError {
        let not_found = status == StatusCode::NOT_FOUND
            || envelope.as_ref().is_some_and(ApiResponse::is_not_found);
        if not_found {
            return FortiError::NotFound {
                path: path.to_string(),
            };
        }

        FortiError::ApiError {
            message: Self::extract_error_message(body, status),
            status_code: envelope
                .as_ref()
                .and_then(|e| e.http_status)
                .or(Some(status.as_u16())),
            error_code: envelope.and_then(|e| e.error),
        }
    }

    /// Extract error message from a failed response body.
    fn extract_error_message(body: &str, status: StatusCode) -> String {
        // Try to parse as JSON and extract message field
        if let Ok(json) = serde_json::from_str::<Value>(body) {
            for key in ["cli_error", "message", "error_description"] {
                if let Some(msg) = json.get(key).and_then(|m| m.as_str()) {
                    return msg.trim().to_string();
                }
            }
            if let Some(code) = json.get("error").and_then(Value::as_i64) {
                return format!("HTTP {status}, error code {code}");
            }
        }

        if body.trim().is_empty() {
            format!("HTTP {status}")
        } else {
            body.to_string()
        }
    }
}

#[async_trait]
impl Transport for FortiClient {
    #[tracing::instrument(skip(self))]
    async fn get(&self, path: &str, params: &QueryParams, scope: &Scope) -> Result<ApiResponse> {
        self.send(Method::GET, path, None, params, scope).await
    }

    #[tracing::instrument(skip(self, body))]
    async fn post(
        &self,
        path: &str,
        body: &Value,
        params: &QueryParams,
        scope: &Scope,
    ) -> Result<ApiResponse> {
        self.send(Method::POST, path, Some(body), params, scope).await
    }

    #[tracing::instrument(skip(self, body))]
    async fn put(
        &self,
        path: &str,
        body: &Value,
        params: &QueryParams,
        scope: &Scope,
    ) -> Result<ApiResponse> {
        self.send(Method::PUT, path, Some(body), params, scope).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, path: &str, params: &QueryParams, scope: &Scope) -> Result<ApiResponse> {
        self.send(Method::DELETE, path, None, params, scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = FortiClient::new("test-token", "https://fw.example.com").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("FortiClient"));
        assert!(debug.contains("base_url"));
        // Token should not be in debug output
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = FortiClient::new("token", "https://fw.example.com").unwrap();
        let client2 = FortiClient::new("token", "https://fw.example.com/").unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
    }

    #[test]
    fn test_classify_not_found() {
        let err = FortiClient::classify(None, StatusCode::NOT_FOUND, "", "api/v2/cmdb/x/y");
        assert!(err.is_not_found());

        let envelope = ApiResponse {
            status: "error".to_string(),
            http_status: Some(500),
            error: Some(-3),
            ..Default::default()
        };
        let err = FortiClient::classify(
            Some(envelope),
            StatusCode::INTERNAL_SERVER_ERROR,
            "",
            "api/v2/cmdb/x/y",
        );
        assert!(err.is_not_found());
    }

    #[test]
    fn test_classify_api_error() {
        let body = r#"{"status":"error","http_status":500,"error":-5,"cli_error":"entry exists"}"#;
        let envelope = serde_json::from_str(body).ok();
        match FortiClient::classify(envelope, StatusCode::INTERNAL_SERVER_ERROR, body, "p") {
            FortiError::ApiError {
                message,
                status_code,
                error_code,
            } => {
                assert_eq!(message, "entry exists");
                assert_eq!(status_code, Some(500));
                assert_eq!(error_code, Some(-5));
            }
            other => panic!("expected ApiError, got {other:?}"),
        }
    }
}
