//! Cluster model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::XplentyClient;
use crate::error::Result;
use crate::mapper::{Context, FieldDecl, FieldKind, Record, Schema};
use crate::pagination::{ListQuery, Page};
use crate::traits::{Create, Delete, Get, List};

use super::{attachment, Resource};

/// Field layout of a cluster payload.
pub static CLUSTER_SCHEMA: Schema = Schema {
    model: "Cluster",
    fields: &[
        FieldDecl::new("id", FieldKind::Int),
        FieldDecl::new("name", FieldKind::Str),
        FieldDecl::new("description", FieldKind::Str),
        FieldDecl::new("status", FieldKind::Str),
        FieldDecl::new("type", FieldKind::Str),
        FieldDecl::new("url", FieldKind::Str),
        FieldDecl::new("html_url", FieldKind::Str),
        FieldDecl::new("stack", FieldKind::Str),
        FieldDecl::new("region", FieldKind::Str),
        FieldDecl::new("zone", FieldKind::Str),
        FieldDecl::new("master_instance_type", FieldKind::Str),
        FieldDecl::new("slave_instance_type", FieldKind::Str),
        FieldDecl::new("owner_id", FieldKind::Int),
        FieldDecl::new("nodes", FieldKind::Int),
        FieldDecl::new("running_jobs_count", FieldKind::Int),
        FieldDecl::new("time_to_idle", FieldKind::Int),
        FieldDecl::new("plan_id", FieldKind::Int),
        FieldDecl::new("master_spot_price", FieldKind::Float),
        FieldDecl::new("slave_spot_price", FieldKind::Float),
        FieldDecl::new("master_spot_percentage", FieldKind::Float),
        FieldDecl::new("slave_spot_percentage", FieldKind::Float),
        FieldDecl::new("created_at", FieldKind::DateTime),
        FieldDecl::new("updated_at", FieldKind::DateTime),
        FieldDecl::new("available_since", FieldKind::DateTime),
        FieldDecl::new("terminated_at", FieldKind::DateTime),
        FieldDecl::new("idle_since", FieldKind::DateTime),
        FieldDecl::new("terminate_on_idle", FieldKind::Bool),
        FieldDecl::new("terminated_on_idle", FieldKind::Bool),
        FieldDecl::new("allow_fallback", FieldKind::Bool),
        FieldDecl::new("bootstrap_actions", FieldKind::List),
        FieldDecl::new("creator", FieldKind::Dict),
    ],
    primary_keys: &["id"],
};

/// An Xplenty cluster.
///
/// Clusters are the compute resources jobs run on. A cluster moves through
/// `pending`, `creating`, `available`, `idle`, and finally `terminated`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Cluster ID.
    pub id: Option<i64>,

    /// Cluster name.
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// Lifecycle status (e.g. "available", "terminated").
    pub status: String,

    /// Cluster type: "production" or "sandbox".
    #[serde(rename = "type")]
    pub cluster_type: String,

    /// API URL of this cluster.
    pub url: String,

    /// Web UI URL of this cluster.
    pub html_url: String,

    /// Software stack the cluster runs.
    pub stack: String,

    pub region: String,
    pub zone: String,
    pub master_instance_type: String,
    pub slave_instance_type: String,

    /// ID of the user owning the cluster.
    pub owner_id: Option<i64>,

    /// Number of nodes.
    pub nodes: Option<i64>,

    /// Number of jobs currently running on the cluster.
    pub running_jobs_count: Option<i64>,

    /// Seconds of idleness before the cluster terminates itself.
    pub time_to_idle: Option<i64>,

    pub plan_id: Option<i64>,
    pub master_spot_price: Option<f64>,
    pub slave_spot_price: Option<f64>,
    pub master_spot_percentage: Option<f64>,
    pub slave_spot_percentage: Option<f64>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    /// When the cluster became available.
    pub available_since: Option<DateTime<Utc>>,

    pub terminated_at: Option<DateTime<Utc>>,

    /// When the cluster last went idle.
    pub idle_since: Option<DateTime<Utc>>,

    /// Whether the cluster terminates after `time_to_idle` seconds idle.
    pub terminate_on_idle: Option<bool>,

    /// Whether the cluster was terminated because it was idle.
    pub terminated_on_idle: Option<bool>,

    pub allow_fallback: Option<bool>,

    /// Bootstrap actions, passed through as-is.
    pub bootstrap_actions: Option<Vec<Value>>,

    /// Creator summary, passed through as-is.
    pub creator: Option<Map<String, Value>>,

    #[serde(skip)]
    pub(crate) context: Context,
}

impl Resource for Cluster {
    fn schema() -> &'static Schema {
        &CLUSTER_SCHEMA
    }

    fn from_record(mut r: Record) -> Self {
        Self {
            id: r.take("id").into_int(),
            name: r.take("name").into_str(),
            description: r.take("description").into_str(),
            status: r.take("status").into_str(),
            cluster_type: r.take("type").into_str(),
            url: r.take("url").into_str(),
            html_url: r.take("html_url").into_str(),
            stack: r.take("stack").into_str(),
            region: r.take("region").into_str(),
            zone: r.take("zone").into_str(),
            master_instance_type: r.take("master_instance_type").into_str(),
            slave_instance_type: r.take("slave_instance_type").into_str(),
            owner_id: r.take("owner_id").into_int(),
            nodes: r.take("nodes").into_int(),
            running_jobs_count: r.take("running_jobs_count").into_int(),
            time_to_idle: r.take("time_to_idle").into_int(),
            plan_id: r.take("plan_id").into_int(),
            master_spot_price: r.take("master_spot_price").into_float(),
            slave_spot_price: r.take("slave_spot_price").into_float(),
            master_spot_percentage: r.take("master_spot_percentage").into_float(),
            slave_spot_percentage: r.take("slave_spot_percentage").into_float(),
            created_at: r.take("created_at").into_datetime(),
            updated_at: r.take("updated_at").into_datetime(),
            available_since: r.take("available_since").into_datetime(),
            terminated_at: r.take("terminated_at").into_datetime(),
            idle_since: r.take("idle_since").into_datetime(),
            terminate_on_idle: r.take("terminate_on_idle").into_bool(),
            terminated_on_idle: r.take("terminated_on_idle").into_bool(),
            allow_fallback: r.take("allow_fallback").into_bool(),
            bootstrap_actions: r.take("bootstrap_actions").into_list(),
            creator: r.take("creator").into_dict(),
            context: r.context().clone(),
        }
    }

    fn identity(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

impl Cluster {
    /// The client this cluster was fetched with, if any.
    pub fn client(&self) -> Option<&XplentyClient> {
        self.context.client()
    }

    /// Check if the cluster can accept jobs.
    pub fn is_available(&self) -> bool {
        matches!(self.status.as_str(), "available" | "idle")
    }

    /// Check if the cluster is gone or going away.
    pub fn is_terminated(&self) -> bool {
        matches!(
            self.status.as_str(),
            "pending_terminate" | "terminating" | "terminated"
        )
    }

    /// Fetch the current state of this cluster.
    ///
    /// # Errors
    ///
    /// Returns [`XplentyError::Detached`](crate::XplentyError::Detached) if
    /// the cluster was not built by a client, or the request error.
    pub async fn refresh(&self) -> Result<Cluster> {
        let (client, id) = attachment("Cluster", &self.context, self.id)?;
        Cluster::get(client, id).await
    }

    /// Terminate this cluster.
    pub async fn terminate(&self) -> Result<Cluster> {
        let (client, id) = attachment("Cluster", &self.context, self.id)?;
        Cluster::delete(client, id).await
    }
}

/// Parameters for creating a cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterCreateParams {
    /// "production" or "sandbox".
    pub cluster_type: String,
    /// Number of nodes.
    pub nodes: u32,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Terminate after `time_to_idle` seconds without jobs.
    pub terminate_on_idle: bool,
    /// Seconds of idleness tolerated, 3600 by default.
    pub time_to_idle: u32,
}

impl ClusterCreateParams {
    /// Parameters with the API defaults for everything but type and size.
    pub fn new(cluster_type: impl Into<String>, nodes: u32) -> Self {
        Self {
            cluster_type: cluster_type.into(),
            nodes,
            name: None,
            description: None,
            terminate_on_idle: false,
            time_to_idle: 3600,
        }
    }

    /// Form fields in the bracketed layout the API expects.
    pub fn to_form(&self) -> Vec<(String, String)> {
        vec![
            ("cluster[type]".to_string(), self.cluster_type.clone()),
            ("cluster[nodes]".to_string(), self.nodes.to_string()),
            (
                "cluster[name]".to_string(),
                self.name.clone().unwrap_or_default(),
            ),
            (
                "cluster[description]".to_string(),
                self.description.clone().unwrap_or_default(),
            ),
            (
                "cluster[terminate_on_idle]".to_string(),
                if self.terminate_on_idle { "1" } else { "0" }.to_string(),
            ),
            (
                "cluster[time_to_idle]".to_string(),
                self.time_to_idle.to_string(),
            ),
        ]
    }
}

#[async_trait]
impl Get for Cluster {
    type Id = i64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &XplentyClient, id: i64) -> Result<Self> {
        let value = client.get(&format!("clusters/{id}")).await?;
        Cluster::from_raw(&value, Some(client))
    }
}

#[async_trait]
impl List for Cluster {
    type Query = ListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &XplentyClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let value = client
            .get_with_query("clusters", &query.to_pairs(offset, limit))
            .await?;
        let clusters = Cluster::from_raw_list(&value, Some(client))?;
        Ok(Page::new(clusters, offset, limit))
    }
}

#[async_trait]
impl Create for Cluster {
    type Params = ClusterCreateParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &XplentyClient, params: Self::Params) -> Result<Self> {
        let value = client.post("clusters", &params.to_form()).await?;
        Cluster::from_raw(&value, Some(client))
    }
}

#[async_trait]
impl Delete for Cluster {
    type Id = i64;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &XplentyClient, id: i64) -> Result<Self> {
        let value = client.delete(&format!("clusters/{id}")).await?;
        Cluster::from_raw(&value, Some(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::XplentyError;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "id": 7,
            "name": "etl-prod",
            "status": "available",
            "type": "production",
            "nodes": "4",
            "master_spot_price": "0.15",
            "created_at": "2015-03-01T12:30:00Z",
            "terminate_on_idle": 1,
            "bootstrap_actions": [{"script_path": "s3://bucket/boot.sh"}],
            "creator": {"id": 3, "type": "User"},
            "unknown_field": "dropped"
        })
    }

    #[test]
    fn test_cluster_from_raw() {
        let cluster = Cluster::from_raw(&sample(), None).unwrap();

        assert_eq!(cluster.id, Some(7));
        assert_eq!(cluster.name, "etl-prod");
        assert_eq!(cluster.cluster_type, "production");
        assert_eq!(cluster.nodes, Some(4));
        assert_eq!(cluster.master_spot_price, Some(0.15));
        assert_eq!(cluster.terminate_on_idle, Some(true));
        assert!(cluster.created_at.is_some());
        assert_eq!(cluster.bootstrap_actions.as_ref().map(Vec::len), Some(1));
        assert_eq!(cluster.creator.as_ref().and_then(|c| c.get("id")), Some(&json!(3)));
        assert!(cluster.is_available());
    }

    #[test]
    fn test_missing_string_fields_get_placeholder() {
        let cluster = Cluster::from_raw(&json!({"id": 1}), None).unwrap();
        assert_eq!(cluster.description, "null");
        assert_eq!(cluster.region, "null");
        assert_eq!(cluster.nodes, None);
    }

    #[test]
    fn test_schema_matches_serialized_fields() {
        let cluster = Cluster::from_raw(&sample(), None).unwrap();
        let exported = serde_json::to_value(&cluster).unwrap();
        let mut keys: Vec<&str> = exported.as_object().unwrap().keys().map(String::as_str).collect();
        let mut declared: Vec<&str> = CLUSTER_SCHEMA.names().collect();

        declared.sort_unstable();
        keys.sort_unstable();
        assert_eq!(keys, declared);
    }

    #[test]
    fn test_export_round_trip() {
        let cluster = Cluster::from_raw(&sample(), None).unwrap();
        let exported = serde_json::to_value(&cluster).unwrap();
        assert_eq!(Cluster::from_raw(&exported, None).unwrap(), cluster);
    }

    #[test]
    fn test_display_uses_id() {
        let cluster = Cluster::from_raw(&sample(), None).unwrap();
        assert_eq!(cluster.to_string(), "<Cluster '7'>");
    }

    #[test]
    fn test_create_params_form() {
        let mut params = ClusterCreateParams::new("sandbox", 1);
        params.name = Some("scratch".to_string());
        params.terminate_on_idle = true;

        let form = params.to_form();
        assert!(form.contains(&("cluster[type]".to_string(), "sandbox".to_string())));
        assert!(form.contains(&("cluster[nodes]".to_string(), "1".to_string())));
        assert!(form.contains(&("cluster[name]".to_string(), "scratch".to_string())));
        assert!(form.contains(&("cluster[description]".to_string(), String::new())));
        assert!(form.contains(&("cluster[terminate_on_idle]".to_string(), "1".to_string())));
        assert!(form.contains(&("cluster[time_to_idle]".to_string(), "3600".to_string())));
    }

    #[tokio::test]
    async fn test_refresh_requires_client() {
        let cluster = Cluster::from_raw(&sample(), None).unwrap();
        let err = cluster.refresh().await.unwrap_err();
        assert!(matches!(err, XplentyError::Detached { model: "Cluster" }));
    }

    #[tokio::test]
    async fn test_terminate_requires_id() {
        let client = XplentyClient::new("acct", "key").unwrap();
        let cluster = Cluster::from_raw(&json!({"name": "no-id"}), Some(&client)).unwrap();
        let err = cluster.terminate().await.unwrap_err();
        assert!(matches!(err, XplentyError::MissingId { model: "Cluster" }));
    }
}
