//! Mock Xplenty API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the Xplenty
//! API for integration and end-to-end testing. Unlike wiremock which mocks at
//! the HTTP level per-test, this server keeps state across requests: a
//! created cluster can be fetched, a started job can be stopped.
//!
//! # Example
//!
//! ```ignore
//! use xplenty::mock_server::MockServer;
//! use xplenty::{Cluster, Get, XplentyClient};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = XplentyClient::with_base_url("acme", "test-key", server.url()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let cluster = Cluster::get(&client, 1).await.unwrap();
//!     assert_eq!(cluster.name, "etl-production");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::Fixtures;
pub use server::MockServer;
pub use state::{MockState, SharedState};
