//! Mock FortiOS API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the FortiOS
//! REST API for integration and end-to-end testing. Unlike wiremock which
//! mocks at the HTTP level per-test, this server maintains state across
//! requests, so create/move/clone/delete workflows can be tested end to end.
//!
//! # Example
//!
//! ```ignore
//! use fortiapi::mock_server::MockServer;
//! use fortiapi::{FortiClient, MovePosition, resources};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = FortiClient::new("test-token", server.url()).unwrap();
//!
//!     // Server comes with default fixtures: policies 1, 2, 3
//!     client
//!         .resource(&resources::FIREWALL_POLICY)
//!         .move_to(3.into(), MovePosition::Top, None)
//!         .await
//!         .unwrap();
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockState, StateError};
