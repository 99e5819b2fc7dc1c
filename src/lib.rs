//! Xplenty API client library.
//!
//! A Rust library for the Xplenty ETL REST API. Responses are decoded into
//! typed resources (clusters, jobs, packages, schedules, account limits)
//! through a lenient field-coercion layer: a value that does not fit its
//! declared type becomes "no value" instead of failing the whole response.
//!
//! # Quick Start
//!
//! ```no_run
//! use xplenty::{Cluster, ClusterCreateParams, Create, Get, Job, JobCreateParams, List, XplentyClient};
//!
//! #[tokio::main]
//! async fn main() -> xplenty::Result<()> {
//!     // Create client from environment variables
//!     let client = XplentyClient::from_env()?;
//!
//!     // List clusters
//!     let clusters = Cluster::list(&client).await?;
//!     println!("Found {} clusters", clusters.len());
//!
//!     // Start a cluster and run a package on it
//!     let cluster = Cluster::create(&client, ClusterCreateParams::new("sandbox", 1)).await?;
//!     let job = Job::create(
//!         &client,
//!         JobCreateParams::new(cluster.id.unwrap_or_default(), 31).variable("DAY", "'2015-03-01'"),
//!     )
//!     .await?;
//!
//!     // Poll it later
//!     let job = Job::get(&client, job.id.unwrap_or_default()).await?;
//!     println!("{} is {}", job, job.status);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`mapper`] holds the generic coercion routine and the [`Record`] it
//!   produces from a [`Schema`].
//! - Each model ([`Cluster`], [`Job`], ...) declares a static schema and
//!   implements [`Resource`] to move a record into typed fields.
//! - The [`Get`], [`List`], [`Create`] and [`Delete`] traits map resources
//!   to endpoints; [`AccountLimits::fetch`] covers the rate limit status.
//! - [`XplentyClient`] builds URLs and headers and sends requests through a
//!   [`Transport`].
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `XPLENTY_ACCOUNT_ID` (required) - Your Xplenty account id
//! - `XPLENTY_API_KEY` (required) - Your Xplenty API key
//! - `XPLENTY_API_URL` (optional) - Base URL (defaults to `https://api.xplenty.com`)

mod client;
mod error;
pub mod mapper;
mod models;
mod pagination;
mod traits;
mod transport;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::XplentyClient;
pub use error::{Result, XplentyError};
pub use mapper::{Context, FieldKind, FieldValue, Record, Schema};
pub use pagination::{Direction, ListQuery, Page};
pub use transport::{ReqwestTransport, Transport};

// Re-export traits
pub use traits::{Create, Delete, Get, List, DEFAULT_PAGE_SIZE};

// Re-export models
pub use models::{
    AccountLimits, Cluster, ClusterCreateParams, Component, Creator, Job, JobCreateParams, Output,
    Package, Resource, Schedule,
};

// Re-export schemas
pub use models::{
    ACCOUNT_LIMITS_SCHEMA, CLUSTER_SCHEMA, COMPONENT_SCHEMA, CREATOR_SCHEMA, JOB_SCHEMA,
    OUTPUT_SCHEMA, PACKAGE_SCHEMA, SCHEDULE_SCHEMA,
};
