//! HTTP request handlers for the mock server.
//!
//! Every CMDB path goes through one handler per method; the resource and
//! key are resolved against the descriptor registry.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use super::state::{MockState, StateError};
use crate::resources;
use crate::{ApiCategory, ResourceDescriptor, NOT_FOUND_ERROR_CODE};

type Shared = Arc<RwLock<MockState>>;

const CMDB_PREFIX: &str = "/api/v2/cmdb/";

/// FortiOS code for "duplicate entry".
const DUPLICATE_ERROR_CODE: i64 = -5;

/// FortiOS code for "invalid value".
const INVALID_ERROR_CODE: i64 = -651;

/// Resolved request target.
struct Target {
    descriptor: &'static ResourceDescriptor,
    key: Option<String>,
}

/// Parsed query string.
struct Query(Vec<(String, String)>);

impl Query {
    fn parse(raw: Option<String>) -> Self {
        let pairs = raw
            .map(|raw| {
                url::form_urlencoded::parse(raw.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self(pairs)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn get_all(&self, key: &str) -> Vec<String> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    fn vdom(&self) -> &str {
        if self.get("global") == Some("1") {
            "global"
        } else {
            self.get("vdom").unwrap_or("root")
        }
    }
}

/// Split a raw request path into a known resource and an optional key.
fn resolve(uri: &Uri) -> Option<Target> {
    let rest = uri.path().strip_prefix(CMDB_PREFIX)?.trim_end_matches('/');
    let find = |path: &str| {
        resources::ALL
            .iter()
            .copied()
            .find(|d| d.category == ApiCategory::Cmdb && d.path == path)
    };

    if let Some(descriptor) = find(rest) {
        return Some(Target {
            descriptor,
            key: None,
        });
    }

    let (path, raw_key) = rest.rsplit_once('/')?;
    let key = urlencoding::decode(raw_key).ok()?.into_owned();
    Some(Target {
        descriptor: find(path)?,
        key: Some(key),
    })
}

fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    let Some(required) = &state.required_token else {
        return true;
    };
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == required)
}

/// Build a FortiOS response envelope.
fn envelope(
    state: &MockState,
    method: &Method,
    descriptor: &ResourceDescriptor,
    query: &Query,
    status: StatusCode,
    extra: Map<String, Value>,
) -> Response {
    let (path, name) = descriptor
        .path
        .split_once('/')
        .unwrap_or((descriptor.path, ""));

    let mut body = json!({
        "http_method": method.as_str(),
        "vdom": query.vdom(),
        "path": path,
        "name": name,
        "status": if status.is_success() { "success" } else { "error" },
        "http_status": status.as_u16(),
        "serial": state.serial,
        "version": state.version,
        "build": state.build,
    });
    if let Value::Object(map) = &mut body {
        map.extend(extra);
    }
    (status, Json(body)).into_response()
}

fn error_response(
    state: &MockState,
    method: &Method,
    target: &Target,
    query: &Query,
    err: StateError,
) -> Response {
    let (status, extra) = match err {
        StateError::NotFound => (
            StatusCode::NOT_FOUND,
            json!({ "error": NOT_FOUND_ERROR_CODE }),
        ),
        StateError::Duplicate => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": DUPLICATE_ERROR_CODE, "cli_error": "entry already exists" }),
        ),
        StateError::Invalid(message) => (
            StatusCode::BAD_REQUEST,
            json!({ "error": INVALID_ERROR_CODE, "cli_error": message }),
        ),
    };
    envelope(state, method, target.descriptor, query, status, object(extra))
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn parse_body(body: &Bytes) -> Result<Map<String, Value>, StateError> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StateError::Invalid("body must be a JSON object".into())),
        Err(e) => Err(StateError::Invalid(e.to_string())),
    }
}

fn unknown_path() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": "error", "http_status": 404 })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "status": "error", "http_status": 401 })),
    )
        .into_response()
}

/// Keep only the attributes named by `format` (pipe-separated).
fn project(entry: &Map<String, Value>, format: Option<&str>) -> Value {
    match format {
        Some(format) => {
            let wanted: Vec<&str> = format.split('|').collect();
            Value::Object(
                entry
                    .iter()
                    .filter(|(k, _)| wanted.contains(&k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            )
        }
        None => Value::Object(entry.clone()),
    }
}

/// GET /api/v2/cmdb/{path}[/{key}]
pub async fn cmdb_get(
    State(state): State<Shared>,
    headers: HeaderMap,
    uri: Uri,
    RawQuery(raw): RawQuery,
) -> Response {
    let state = state.read().await;
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let Some(target) = resolve(&uri) else {
        return unknown_path();
    };
    let query = Query::parse(raw);
    let method = Method::GET;
    let format = query.get("format");

    let results = match (&target.key, target.descriptor.is_singleton()) {
        (None, true) => match state.singletons.get(target.descriptor.path) {
            Some(object) => project(object, format),
            None => return error_response(&state, &method, &target, &query, StateError::NotFound),
        },
        (None, false) => {
            let entries = match state.list(target.descriptor, &query.get_all("filter")) {
                Ok(entries) => entries,
                Err(err) => return error_response(&state, &method, &target, &query, err),
            };
            let start = query.get("start").and_then(|s| s.parse().ok()).unwrap_or(0);
            let count = query
                .get("count")
                .and_then(|c| c.parse().ok())
                .unwrap_or(usize::MAX);
            Value::Array(
                entries
                    .into_iter()
                    .skip(start)
                    .take(count)
                    .map(|e| project(e, format))
                    .collect(),
            )
        }
        (Some(key), _) => match state.get_entry(target.descriptor, key) {
            Some(entry) => Value::Array(vec![project(entry, format)]),
            None => return error_response(&state, &method, &target, &query, StateError::NotFound),
        },
    };

    envelope(
        &state,
        &method,
        target.descriptor,
        &query,
        StatusCode::OK,
        object(json!({ "results": results })),
    )
}

/// POST /api/v2/cmdb/{path} creates; POST /api/v2/cmdb/{path}/{key}?action=clone copies.
pub async fn cmdb_post(
    State(state): State<Shared>,
    headers: HeaderMap,
    uri: Uri,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let mut state = state.write().await;
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let Some(target) = resolve(&uri) else {
        return unknown_path();
    };
    let query = Query::parse(raw);
    let method = Method::POST;

    let result = match &target.key {
        None => parse_body(&body).and_then(|entry| state.create(target.descriptor, entry)),
        Some(key) => match (query.get("action"), query.get("nkey")) {
            (Some("clone"), Some(nkey)) => state
                .clone_entry(target.descriptor, key, nkey)
                .map(|()| target.descriptor.parse_mkey(nkey)),
            _ => Err(StateError::Invalid("unsupported POST on object".into())),
        },
    };

    match result {
        Ok(mkey) => envelope(
            &state,
            &method,
            target.descriptor,
            &query,
            StatusCode::OK,
            object(json!({ "mkey": mkey })),
        ),
        Err(err) => error_response(&state, &method, &target, &query, err),
    }
}

/// PUT /api/v2/cmdb/{path}/{key} updates, or moves with `action=move`.
/// PUT /api/v2/cmdb/{path} updates a singleton.
pub async fn cmdb_put(
    State(state): State<Shared>,
    headers: HeaderMap,
    uri: Uri,
    RawQuery(raw): RawQuery,
    body: Bytes,
) -> Response {
    let mut state = state.write().await;
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let Some(target) = resolve(&uri) else {
        return unknown_path();
    };
    let query = Query::parse(raw);
    let method = Method::PUT;

    let result = match &target.key {
        None if target.descriptor.is_singleton() => parse_body(&body).map(|changes| {
            state.update_singleton(target.descriptor, changes);
        }),
        None => Err(StateError::Invalid("PUT requires an object key".into())),
        Some(key) if query.get("action") == Some("move") => {
            match (query.get("before"), query.get("after")) {
                (Some(reference), None) => state.move_entry(target.descriptor, key, reference, false),
                (None, Some(reference)) => state.move_entry(target.descriptor, key, reference, true),
                _ => Err(StateError::Invalid("move needs exactly one of before/after".into())),
            }
        }
        Some(key) => parse_body(&body).and_then(|changes| state.update(target.descriptor, key, changes)),
    };

    match result {
        Ok(()) => {
            let extra = match &target.key {
                Some(key) => object(json!({ "mkey": target.descriptor.parse_mkey(key) })),
                None => Map::new(),
            };
            envelope(&state, &method, target.descriptor, &query, StatusCode::OK, extra)
        }
        Err(err) => error_response(&state, &method, &target, &query, err),
    }
}

/// DELETE /api/v2/cmdb/{path}/{key}
pub async fn cmdb_delete(
    State(state): State<Shared>,
    headers: HeaderMap,
    uri: Uri,
    RawQuery(raw): RawQuery,
) -> Response {
    let mut state = state.write().await;
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let Some(target) = resolve(&uri) else {
        return unknown_path();
    };
    let query = Query::parse(raw);
    let method = Method::DELETE;

    let result = match &target.key {
        Some(key) => state.delete(target.descriptor, key),
        None => Err(StateError::Invalid("DELETE requires an object key".into())),
    };

    match result {
        Ok(()) => envelope(&state, &method, target.descriptor, &query, StatusCode::OK, Map::new()),
        Err(err) => error_response(&state, &method, &target, &query, err),
    }
}

/// GET /api/v2/monitor/system/status
pub async fn system_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let state = state.read().await;
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    let query = Query::parse(raw);
    let results = json!({
        "model_name": "FortiGate",
        "model_number": "VM64",
        "model": "FGVM64",
        "hostname": "mock-fgt",
        "log_disk_status": "available",
    });
    envelope(
        &state,
        &Method::GET,
        &resources::MONITOR_SYSTEM_STATUS,
        &query,
        StatusCode::OK,
        object(json!({ "results": results })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_collection_and_object() {
        let uri: Uri = "/api/v2/cmdb/firewall/address".parse().unwrap();
        let target = resolve(&uri).unwrap();
        assert_eq!(target.descriptor.path, "firewall/address");
        assert!(target.key.is_none());

        let uri: Uri = "/api/v2/cmdb/firewall/address/10.0.0.0%2F24".parse().unwrap();
        let target = resolve(&uri).unwrap();
        assert_eq!(target.key.as_deref(), Some("10.0.0.0/24"));

        let uri: Uri = "/api/v2/cmdb/switch-controller/managed-switch/S108E".parse().unwrap();
        assert_eq!(resolve(&uri).unwrap().key.as_deref(), Some("S108E"));

        let uri: Uri = "/api/v2/cmdb/firewall/nope/x".parse().unwrap();
        assert!(resolve(&uri).is_none());
    }

    #[test]
    fn test_query_scope() {
        assert_eq!(Query::parse(None).vdom(), "root");
        assert_eq!(Query::parse(Some("vdom=dmz".into())).vdom(), "dmz");
        assert_eq!(Query::parse(Some("global=1".into())).vdom(), "global");
        assert_eq!(
            Query::parse(Some("filter=a%3D%3D1&filter=b%3D%3D2".into())).get_all("filter"),
            vec!["a==1", "b==2"]
        );
    }
}
