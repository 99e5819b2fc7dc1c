//! Mock server state management.
//!
//! Provides the in-memory data store for the mock Xplenty API server.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;

use crate::{AccountLimits, Cluster, Job, Package, Resource, Schedule};

/// State shared between the server's handlers.
pub type SharedState = Arc<RwLock<MockState>>;

/// Shared state for the mock server.
///
/// Resources are stored as typed models and served through their
/// serialized form, so every response has been through the mapper once.
#[derive(Debug, Default)]
pub struct MockState {
    /// Clusters indexed by ID.
    pub clusters: BTreeMap<i64, Cluster>,

    /// Jobs indexed by ID.
    pub jobs: BTreeMap<i64, Job>,

    /// Packages indexed by ID.
    pub packages: BTreeMap<i64, Package>,

    /// Schedules indexed by ID.
    pub schedules: BTreeMap<i64, Schedule>,

    /// Rate limit status served at `rate_limit_status`.
    pub limits: Option<AccountLimits>,

    /// Optional API key. If set, requests must authenticate with it.
    pub required_key: Option<String>,

    /// Last ID handed out for a created resource.
    last_id: i64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Add a cluster to the state.
    pub fn with_cluster(mut self, cluster: Cluster) -> Self {
        self.insert_cluster(cluster);
        self
    }

    /// Add a job to the state.
    pub fn with_job(mut self, job: Job) -> Self {
        let id = job.id.unwrap_or_default();
        self.bump_id(id);
        self.jobs.insert(id, job);
        self
    }

    /// Add a package to the state.
    pub fn with_package(mut self, package: Package) -> Self {
        let id = package.id.unwrap_or_default();
        self.bump_id(id);
        self.packages.insert(id, package);
        self
    }

    /// Add a schedule to the state.
    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        let id = schedule.id.unwrap_or_default();
        self.bump_id(id);
        self.schedules.insert(id, schedule);
        self
    }

    /// Set the rate limit status.
    pub fn with_limits(mut self, limits: AccountLimits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Set the required API key.
    pub fn with_required_key(mut self, key: &str) -> Self {
        self.required_key = Some(key.to_string());
        self
    }

    pub(crate) fn insert_cluster(&mut self, cluster: Cluster) {
        let id = cluster.id.unwrap_or_default();
        self.bump_id(id);
        self.clusters.insert(id, cluster);
    }

    fn bump_id(&mut self, id: i64) {
        self.last_id = self.last_id.max(id);
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// List clusters, optionally filtered by status.
    pub fn list_clusters(&self, status: Option<&str>) -> Vec<&Cluster> {
        self.clusters
            .values()
            .filter(|c| status.map(|s| c.status == s).unwrap_or(true))
            .collect()
    }

    /// List jobs, optionally filtered by status.
    pub fn list_jobs(&self, status: Option<&str>) -> Vec<&Job> {
        self.jobs
            .values()
            .filter(|j| status.map(|s| j.status == s).unwrap_or(true))
            .collect()
    }

    /// Create a cluster from the API's form fields.
    pub fn create_cluster(&mut self, form: &HashMap<String, String>) -> Result<&Cluster, String> {
        let cluster_type = form
            .get("cluster[type]")
            .ok_or_else(|| "cluster[type] is required".to_string())?;
        let nodes = form
            .get("cluster[nodes]")
            .ok_or_else(|| "cluster[nodes] is required".to_string())?;

        let id = self.next_id();
        let raw = json!({
            "id": id,
            "name": form.get("cluster[name]"),
            "description": form.get("cluster[description]"),
            "type": cluster_type,
            "status": "pending",
            "nodes": nodes,
            "terminate_on_idle": form.get("cluster[terminate_on_idle]").map(|v| v == "1"),
            "time_to_idle": form.get("cluster[time_to_idle]"),
            "running_jobs_count": 0,
            "created_at": now(),
            "url": format!("/clusters/{id}"),
        });
        let cluster = Cluster::from_raw(&raw, None).map_err(|e| e.to_string())?;
        if cluster.nodes.is_none() {
            return Err("cluster[nodes] must be a number".to_string());
        }

        self.clusters.insert(id, cluster);
        Ok(&self.clusters[&id])
    }

    /// Mark a cluster as terminating and return it.
    pub fn terminate_cluster(&mut self, id: i64) -> Option<&Cluster> {
        let cluster = self.clusters.get_mut(&id)?;
        cluster.status = "pending_terminate".to_string();
        Some(cluster)
    }

    /// Start a job from the API's form fields.
    pub fn create_job(&mut self, form: &HashMap<String, String>) -> Result<&Job, String> {
        let cluster_id: i64 = form
            .get("job[cluster_id]")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| "job[cluster_id] is required".to_string())?;
        let package_id: i64 = form
            .get("job[job_id]")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| "job[job_id] is required".to_string())?;

        let cluster = self
            .clusters
            .get(&cluster_id)
            .ok_or_else(|| format!("cluster {cluster_id} does not exist"))?;
        if !self.packages.contains_key(&package_id) {
            return Err(format!("package {package_id} does not exist"));
        }
        let cluster = serde_json::to_value(cluster).map_err(|e| e.to_string())?;

        let id = self.next_id();
        let raw = json!({
            "id": id,
            "status": "pending",
            "progress": 0.0,
            "cluster_id": cluster_id,
            "package_id": package_id,
            "created_at": now(),
            "variables": bracketed(form, "job[variables]["),
            "dynamic_variables": bracketed(form, "job[dynamic_variables]["),
            "cluster": cluster,
            "url": format!("/jobs/{id}"),
        });
        let job = Job::from_raw(&raw, None).map_err(|e| e.to_string())?;

        self.jobs.insert(id, job);
        Ok(&self.jobs[&id])
    }

    /// Mark a job as stopping and return it.
    pub fn stop_job(&mut self, id: i64) -> Option<&Job> {
        let job = self.jobs.get_mut(&id)?;
        if !job.is_finished() {
            job.status = "stopping".to_string();
        }
        Some(job)
    }
}

/// Collect `prefix + key + "]"` form fields into an object keyed by `key`.
fn bracketed(form: &HashMap<String, String>, prefix: &str) -> Map<String, Value> {
    form.iter()
        .filter_map(|(k, v)| {
            let name = k.strip_prefix(prefix)?.strip_suffix(']')?;
            Some((name.to_string(), Value::String(v.clone())))
        })
        .collect()
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
