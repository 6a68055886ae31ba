//! FortiOS REST API client library.
//!
//! Every CMDB resource type is served by one generic [`ResourceClient`]
//! driven by a static [`ResourceDescriptor`]: wire path, identity key,
//! field metadata, sub-table specs and the write operations it supports.
//!
//! # Quick Start
//!
//! ```no_run
//! use fortiapi::{FortiClient, Fields, GetQuery, MovePosition, resources};
//!
//! #[tokio::main]
//! async fn main() -> fortiapi::Result<()> {
//!     // Create client from environment variables
//!     let client = FortiClient::from_env()?;
//!
//!     // Create or update an address, whichever applies
//!     let addresses = client.resource(&resources::FIREWALL_ADDRESS);
//!     addresses
//!         .set(&Fields::new()
//!             .set("name", "web-01")
//!             .set("subnet", "10.0.0.10 255.255.255.255"))
//!         .await?;
//!
//!     // Sub-table fields accept bare names
//!     let groups = client.resource(&resources::FIREWALL_ADDRGRP);
//!     groups
//!         .set(&Fields::new().set("name", "web").set("member", "web-01"))
//!         .await?;
//!
//!     // Filters use FortiOS syntax; `&` separates ANDed predicates
//!     let fqdn = addresses
//!         .get(&GetQuery::default().filter("type==fqdn&name=@corp"))
//!         .await?;
//!     println!("{} fqdn addresses", fqdn.entries().len());
//!
//!     // Move policy 7 to the second slot
//!     client
//!         .resource(&resources::FIREWALL_POLICY)
//!         .move_to(7.into(), MovePosition::Ordinal(2), None)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Transport`] - the four HTTP verbs, implemented by [`FortiClient`]
//! - [`ResourceClient`] - get/create/update/set/delete/move/clone for one resource type
//! - [`resources`] - the descriptor registry
//! - [`Fields`] and [`Provided`] - payload construction where unset fields are never sent
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `FORTIOS_HOST` (required) - Device URL or host
//! - `FORTIOS_TOKEN` (required) - REST API admin token
//! - `FORTIOS_VDOM` (optional) - Default VDOM
//! - `FORTIOS_VERIFY_TLS` (optional) - Set to `false` for self-signed certificates
//! - `FORTIOS_TIMEOUT_SECS` (optional) - Request timeout, default 300

mod client;
mod config;
mod error;
mod moves;
mod normalize;
mod pagination;
mod resource;
mod transport;

pub mod cli;
pub mod mcp;
pub mod output;
pub mod resources;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::FortiClient;
pub use config::{ClientConfig, TlsMode, DEFAULT_TIMEOUT_SECS};
pub use error::{FortiError, Result, ValidationError};
pub use pagination::Page;
pub use transport::{ApiResponse, QueryParams, Scope, Transport, NOT_FOUND_ERROR_CODE};

// Resource layer
pub use resource::{
    mkey_segment, ApiCategory, Capability, FieldKind, FieldSpec, GetQuery, MkeyKind,
    ResourceClient, ResourceDescriptor, DEFAULT_PAGE_SIZE,
};

// Normalization
pub use moves::{resolve_move, Anchor, MovePosition, MoveTarget};
pub use normalize::{
    build_payload, normalize_filters, normalize_table_field, Fields, FilterExpr, FilterInput,
    FilterOp, FilterParam, ParseFilterError, Provided, TableFieldSpec,
};
