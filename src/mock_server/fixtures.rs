//! Test data fixtures for the mock server.
//!
//! Fixtures are built from JSON payloads shaped like real API responses, so
//! they go through the same coercion as anything the client receives.

use serde_json::{json, Value};

use crate::{AccountLimits, Cluster, Job, Package, Resource, Schedule};

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    // =========================================================================
    // Cluster Fixtures
    // =========================================================================

    /// Create a sandbox cluster with the given status.
    pub fn cluster(id: i64, name: &str, status: &str) -> Cluster {
        build(json!({
            "id": id,
            "name": name,
            "description": format!("{name} cluster"),
            "status": status,
            "type": "sandbox",
            "nodes": 1,
            "owner_id": 7,
            "running_jobs_count": 0,
            "terminate_on_idle": true,
            "time_to_idle": 3600,
            "created_at": "2015-03-01T10:00:00Z",
            "updated_at": "2015-03-01T10:05:00Z",
            "url": format!("/clusters/{id}"),
        }))
    }

    /// Create a production cluster with several nodes.
    pub fn production_cluster(id: i64, name: &str, nodes: i64) -> Cluster {
        let mut cluster = Self::cluster(id, name, "available");
        cluster.cluster_type = "production".to_string();
        cluster.nodes = Some(nodes);
        cluster
    }

    // =========================================================================
    // Package Fixtures
    // =========================================================================

    /// Create an active package.
    pub fn package(id: i64, name: &str) -> Package {
        build(json!({
            "id": id,
            "name": name,
            "description": "",
            "status": "active",
            "owner_id": 7,
            "variables": {"DAY": "'2015-03-01'"},
            "created_at": "2015-02-20T08:00:00Z",
            "url": format!("/packages/{id}"),
        }))
    }

    // =========================================================================
    // Schedule Fixtures
    // =========================================================================

    /// Create an enabled daily schedule.
    pub fn schedule(id: i64, name: &str) -> Schedule {
        build(json!({
            "id": id,
            "name": name,
            "status": "enabled",
            "interval_amount": 1,
            "interval_unit": "days",
            "execution_count": 12,
            "last_run_status": "completed",
            "start_at": "2015-03-01T00:00:00Z",
            "next_run_at": "2015-03-14T00:00:00Z",
            "url": format!("/schedules/{id}"),
        }))
    }

    // =========================================================================
    // Job Fixtures
    // =========================================================================

    /// Create a job of `package_id` on `cluster` with a single output.
    pub fn job(id: i64, cluster: &Cluster, package_id: i64, status: &str) -> Job {
        let progress = if status == "completed" { 1.0 } else { 0.5 };
        build(json!({
            "id": id,
            "status": status,
            "progress": progress,
            "cluster_id": cluster.id,
            "package_id": package_id,
            "owner_id": 7,
            "outputs_count": 1,
            "created_at": "2015-03-01T10:10:00Z",
            "started_at": "2015-03-01T10:11:00Z",
            "variables": {"DAY": "'2015-03-01'"},
            "cluster": to_json(cluster),
            "creator": {"id": 7, "type": "User", "display_name": "Jane Doe"},
            "outputs": [{
                "id": id * 100,
                "name": "daily_rollup",
                "records_count": 1500,
                "path": format!("s3://bucket/jobs/{id}/daily_rollup"),
                "component": {"name": "destination_1", "type": "cloud_storage_destination"},
            }],
            "url": format!("/jobs/{id}"),
        }))
    }

    // =========================================================================
    // Account Fixtures
    // =========================================================================

    /// Create a rate limit status.
    pub fn limits(limit: i64, remaining: i64) -> AccountLimits {
        build(json!({"limit": limit, "remaining": remaining}))
    }

    // =========================================================================
    // Scenarios
    // =========================================================================

    /// Default scenario with a small, consistent account.
    pub fn default_scenario() -> DefaultScenario {
        let production = Self::production_cluster(1, "etl-production", 4);
        let sandbox = Self::cluster(2, "scratch", "terminated");

        let packages = vec![Self::package(10, "daily_rollup"), Self::package(11, "backfill")];

        let jobs = vec![
            Self::job(20, &production, 10, "completed"),
            Self::job(21, &production, 11, "running"),
        ];

        DefaultScenario {
            clusters: vec![production, sandbox],
            jobs,
            packages,
            schedules: vec![Self::schedule(30, "nightly")],
            limits: Self::limits(5000, 4990),
        }
    }
}

/// Default test scenario with related clusters, jobs and packages.
pub struct DefaultScenario {
    pub clusters: Vec<Cluster>,
    pub jobs: Vec<Job>,
    pub packages: Vec<Package>,
    pub schedules: Vec<Schedule>,
    pub limits: AccountLimits,
}

/// Fixture payloads are objects, so building from them cannot fail.
fn build<T: Resource>(raw: Value) -> T {
    match T::from_raw(&raw, None) {
        Ok(resource) => resource,
        Err(e) => unreachable!("fixture payload is an object: {e}"),
    }
}

fn to_json(cluster: &Cluster) -> Value {
    serde_json::to_value(cluster).unwrap_or(Value::Null)
}
