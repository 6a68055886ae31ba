//! Generic resource client.
//!
//! One [`ResourceClient`] serves every resource type; what differs between
//! `firewall/address` and `firewall/policy` lives in a static
//! [`ResourceDescriptor`].
//!
//! # Example
//!
//! ```no_run
//! use fortiapi::{FortiClient, Fields, MovePosition, resources};
//!
//! # async fn example() -> fortiapi::Result<()> {
//! let client = FortiClient::from_env()?;
//! let addresses = client.resource(&resources::FIREWALL_ADDRESS);
//!
//! addresses
//!     .set(&Fields::new()
//!         .set("name", "web-server")
//!         .set("subnet", "10.0.0.10 255.255.255.255"))
//!     .await?;
//!
//! let policies = client.resource(&resources::FIREWALL_POLICY);
//! policies.move_to(7.into(), MovePosition::Top, None).await?;
//! # Ok(())
//! # }
//! ```

mod descriptor;

pub use descriptor::{
    mkey_segment, ApiCategory, Capability, FieldKind, FieldSpec, MkeyKind, ResourceDescriptor,
};

use serde_json::{Map, Value};

use crate::error::{Result, ValidationError};
use crate::moves::{resolve_move, MovePosition};
use crate::normalize::{Fields, FilterInput};
use crate::pagination::Page;
use crate::transport::{ApiResponse, QueryParams, Scope, Transport};

/// Default page size for [`ResourceClient::list_all`].
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 1000;

/// Read options for [`ResourceClient::get`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetQuery {
    /// Fetch one object instead of the collection.
    pub mkey: Option<Value>,
    pub filter: Option<FilterInput>,
    /// Sort expression (`name,asc`).
    pub sort: Option<String>,
    /// Restrict returned attributes.
    pub format: Vec<String>,
    pub start: Option<u32>,
    pub count: Option<u32>,
    /// Ask for object metadata (`q_ref`, `q_type`, ...).
    pub with_meta: bool,
    /// Include datasource details for referenced objects.
    pub datasource: bool,
    /// Skip objects the admin has no read access to.
    pub skip: bool,
}

impl GetQuery {
    /// Query for a single object.
    pub fn by_mkey(mkey: impl Into<Value>) -> Self {
        Self {
            mkey: Some(mkey.into()),
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: impl Into<FilterInput>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn format<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.format = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Query-string form, without scope.
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(filter) = self.filter.as_ref().and_then(FilterInput::normalize) {
            filter.append_to(&mut params);
        }
        if let Some(sort) = &self.sort {
            params.push("sort", sort);
        }
        if !self.format.is_empty() {
            params.push("format", self.format.join("|"));
        }
        if let Some(start) = self.start {
            params.push("start", start.to_string());
        }
        if let Some(count) = self.count {
            params.push("count", count.to_string());
        }
        for (enabled, key) in [
            (self.with_meta, "with_meta"),
            (self.datasource, "datasource"),
            (self.skip, "skip"),
        ] {
            if enabled {
                params.push(key, "1");
            }
        }
        params
    }
}

/// Client for one resource type over any [`Transport`].
///
/// Every call is independent. `set` and ordinal `move_to` read before they
/// write and can race with other writers; the device has the final say.
pub struct ResourceClient<'a, T: Transport + ?Sized> {
    transport: &'a T,
    descriptor: &'static ResourceDescriptor,
    scope: Scope,
}

impl<T: Transport + ?Sized> Clone for ResourceClient<'_, T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport,
            descriptor: self.descriptor,
            scope: self.scope.clone(),
        }
    }
}

impl<'a, T: Transport + ?Sized> ResourceClient<'a, T> {
    pub fn new(transport: &'a T, descriptor: &'static ResourceDescriptor) -> Self {
        Self {
            transport,
            descriptor,
            scope: Scope::Default,
        }
    }

    /// Target a specific VDOM or the global scope.
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn descriptor(&self) -> &'static ResourceDescriptor {
        self.descriptor
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Fetch the collection, or one object when `query.mkey` is set.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn get(&self, query: &GetQuery) -> Result<ApiResponse> {
        let path = match &query.mkey {
            Some(mkey) => self.object_path(mkey)?,
            None => self.descriptor.api_path(),
        };
        self.transport
            .get(&path, &query.to_params(), &self.scope)
            .await
    }

    /// Fetch one window of the collection.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn list_page(&self, query: &GetQuery, start: u32, count: u32) -> Result<Page<Value>> {
        let query = GetQuery {
            mkey: None,
            start: Some(start),
            count: Some(count),
            ..query.clone()
        };
        let response = self.get(&query).await?;
        Ok(Page::new(response.into_entries(), start, count, None))
    }

    /// Fetch the whole collection, page by page.
    pub async fn list_all(&self, query: &GetQuery) -> Result<Vec<Value>> {
        let mut all_items = Vec::new();
        let mut start = 0;
        let mut pages = 0;

        loop {
            let page = self.list_page(query, start, DEFAULT_PAGE_SIZE).await?;
            let has_more = page.has_more;
            start = page.next_start();
            all_items.extend(page.items);

            if !has_more {
                break;
            }
            pages += 1;

            // Safety limit to prevent infinite loops
            if pages >= MAX_PAGES {
                tracing::warn!("Reached pagination limit of {} pages, stopping", MAX_PAGES);
                break;
            }
        }

        Ok(all_items)
    }

    /// Whether an object with this identifier exists.
    ///
    /// Any answer the transport accepts means the object is there. A
    /// not-found answer is `Ok(false)`; every other failure propagates.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn exists(&self, mkey: &Value) -> Result<bool> {
        let path = self.object_path(mkey)?;
        match self.transport.get(&path, &QueryParams::new(), &self.scope).await {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Create a new object.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn create(&self, fields: &Fields) -> Result<ApiResponse> {
        let payload = fields.build(self.descriptor)?;
        self.post_payload(payload).await
    }

    /// Update an existing object. The identifier is read from the payload
    /// and also stays in the body.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn update(&self, fields: &Fields) -> Result<ApiResponse> {
        let payload = fields.build(self.descriptor)?;
        self.put_payload(payload).await
    }

    /// Create or update, depending on whether the identifier exists.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn set(&self, fields: &Fields) -> Result<ApiResponse> {
        let payload = fields.build(self.descriptor)?;
        if self.descriptor.is_singleton() {
            return self.put_payload(payload).await;
        }

        let mkey = self.descriptor.identity(&payload)?.clone();
        if self.exists(&mkey).await? {
            tracing::debug!(%mkey, "object exists, updating");
            self.put_payload(payload).await
        } else {
            tracing::debug!(%mkey, "object not found, creating");
            self.post_payload(payload).await
        }
    }

    /// Delete an object.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn delete(&self, mkey: &Value) -> Result<ApiResponse> {
        self.require(Capability::Delete)?;
        let path = self.object_path(mkey)?;
        self.transport
            .delete(&path, &QueryParams::new(), &self.scope)
            .await
    }

    /// Move an object within its ordered table.
    ///
    /// `Top`, `Bottom` and ordinal positions read the current order first.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn move_to(
        &self,
        mkey: Value,
        position: MovePosition,
        reference: Option<Value>,
    ) -> Result<ApiResponse> {
        self.require(Capability::Move)?;
        let path = self.object_path(&mkey)?;

        let target = resolve_move(position, reference, || self.ordered_mkeys()).await?;
        let reference = mkey_segment(&target.reference)
            .ok_or(ValidationError::MissingReference {
                anchor: target.anchor,
            })?;

        let params = QueryParams::new()
            .with("action", "move")
            .with(target.anchor.as_str(), reference);
        self.transport
            .put(&path, &empty_body(), &params, &self.scope)
            .await
    }

    /// Copy an object under a new identifier.
    #[tracing::instrument(skip(self), fields(resource = self.descriptor.path))]
    pub async fn clone_to(&self, mkey: &Value, new_mkey: &Value) -> Result<ApiResponse> {
        self.require(Capability::Clone)?;
        let path = self.object_path(mkey)?;
        let nkey = self.segment(new_mkey)?;

        let params = QueryParams::new()
            .with("action", "clone")
            .with("nkey", nkey);
        self.transport
            .post(&path, &empty_body(), &params, &self.scope)
            .await
    }

    // -------------------------------------------------------------------------
    // Metadata
    // -------------------------------------------------------------------------

    pub fn fields(&self) -> Vec<&'static str> {
        self.descriptor.field_names()
    }

    pub fn required_fields(&self) -> Vec<&'static str> {
        self.descriptor.required_fields()
    }

    pub fn defaults(&self) -> Map<String, Value> {
        self.descriptor.defaults()
    }

    pub fn describe(&self, field: &str) -> Option<String> {
        self.descriptor.describe(field)
    }

    pub fn schema(&self) -> Value {
        self.descriptor.schema()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.descriptor.supports(capability)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    async fn post_payload(&self, payload: Map<String, Value>) -> Result<ApiResponse> {
        self.require(Capability::Create)?;
        self.transport
            .post(
                &self.descriptor.api_path(),
                &Value::Object(payload),
                &QueryParams::new(),
                &self.scope,
            )
            .await
    }

    async fn put_payload(&self, payload: Map<String, Value>) -> Result<ApiResponse> {
        self.require(Capability::Update)?;
        let path = if self.descriptor.is_singleton() {
            self.descriptor.api_path()
        } else {
            let mkey = self.descriptor.identity(&payload)?;
            self.object_path(mkey)?
        };
        self.transport
            .put(&path, &Value::Object(payload), &QueryParams::new(), &self.scope)
            .await
    }

    /// Identifiers of the collection in device order.
    async fn ordered_mkeys(&self) -> Result<Vec<Value>> {
        let mkey = self.descriptor.mkey.unwrap_or_default();
        let response = self.get(&GetQuery::default().format([mkey])).await?;
        Ok(response
            .into_entries()
            .into_iter()
            .filter_map(|mut entry| entry.get_mut(mkey).map(Value::take))
            .collect())
    }

    fn object_path(&self, mkey: &Value) -> Result<String> {
        let segment = self.segment(mkey)?;
        Ok(self.descriptor.object_path(&segment))
    }

    fn segment(&self, mkey: &Value) -> Result<String> {
        let field = self.descriptor.mkey.ok_or_else(|| ValidationError::Unsupported {
            operation: "addressing by identifier",
            resource: self.descriptor.path.to_string(),
        })?;
        mkey_segment(mkey).ok_or_else(|| {
            ValidationError::MissingIdentity {
                resource: self.descriptor.path.to_string(),
                field: field.to_string(),
            }
            .into()
        })
    }

    fn require(&self, capability: Capability) -> Result<()> {
        if self.descriptor.supports(capability) {
            Ok(())
        } else {
            Err(ValidationError::Unsupported {
                operation: capability.as_str(),
                resource: self.descriptor.path.to_string(),
            }
            .into())
        }
    }
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_query_params() {
        let query = GetQuery::default()
            .filter("filter=name==a&type==fqdn")
            .sort("name,asc")
            .format(["name", "subnet"]);
        let params = query.to_params();

        assert_eq!(params.get_all("filter"), vec!["name==a", "type==fqdn"]);
        assert_eq!(params.get("sort"), Some("name,asc"));
        assert_eq!(params.get("format"), Some("name|subnet"));
        assert_eq!(params.get("with_meta"), None);
    }

    #[test]
    fn test_get_query_flags_and_window() {
        let query = GetQuery {
            start: Some(0),
            count: Some(50),
            with_meta: true,
            skip: true,
            ..Default::default()
        };
        let params = query.to_params();

        assert_eq!(params.get("start"), Some("0"));
        assert_eq!(params.get("count"), Some("50"));
        assert_eq!(params.get("with_meta"), Some("1"));
        assert_eq!(params.get("skip"), Some("1"));
        assert_eq!(params.get("datasource"), None);
    }

    #[test]
    fn test_empty_filter_adds_nothing() {
        let params = GetQuery::default().filter("filter=").to_params();
        assert!(params.is_empty());
    }
}
