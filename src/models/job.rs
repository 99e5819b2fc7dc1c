//! Job model, its nested output/creator types, and trait implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::XplentyClient;
use crate::error::Result;
use crate::mapper::{Context, FieldDecl, FieldKind, Record, Schema};
use crate::pagination::{ListQuery, Page};
use crate::traits::{Create, Delete, Get, List};

use super::{attachment, Cluster, Resource, CLUSTER_SCHEMA};

/// Field layout of an output component.
pub static COMPONENT_SCHEMA: Schema = Schema {
    model: "Component",
    fields: &[
        FieldDecl::new("name", FieldKind::Str),
        FieldDecl::new("type", FieldKind::Str),
        FieldDecl::new("fields", FieldKind::List),
    ],
    primary_keys: &["name"],
};

/// Field layout of a job output.
pub static OUTPUT_SCHEMA: Schema = Schema {
    model: "Output",
    fields: &[
        FieldDecl::new("id", FieldKind::Int),
        FieldDecl::new("name", FieldKind::Str),
        FieldDecl::new("records_count", FieldKind::Int),
        FieldDecl::new("bytes_count", FieldKind::Int),
        FieldDecl::new("preview_url", FieldKind::Str),
        FieldDecl::new("url", FieldKind::Str),
        FieldDecl::new("preview_type", FieldKind::Str),
        FieldDecl::new("path", FieldKind::Str),
        FieldDecl::new("created_at", FieldKind::DateTime),
        FieldDecl::new("updated_at", FieldKind::DateTime),
        FieldDecl::new("can_preview", FieldKind::Bool),
        FieldDecl::new("can_download", FieldKind::Bool),
        FieldDecl::new("component", FieldKind::Object(&COMPONENT_SCHEMA)),
    ],
    primary_keys: &["id"],
};

/// Field layout of a job creator.
pub static CREATOR_SCHEMA: Schema = Schema {
    model: "Creator",
    fields: &[
        FieldDecl::new("id", FieldKind::Int),
        FieldDecl::new("type", FieldKind::Str),
        FieldDecl::new("url", FieldKind::Str),
        FieldDecl::new("html_url", FieldKind::Str),
        FieldDecl::new("display_name", FieldKind::Str),
    ],
    primary_keys: &["id"],
};

/// Field layout of a job payload.
pub static JOB_SCHEMA: Schema = Schema {
    model: "Job",
    fields: &[
        FieldDecl::new("id", FieldKind::Int),
        FieldDecl::new("status", FieldKind::Str),
        FieldDecl::new("errors", FieldKind::Str),
        FieldDecl::new("url", FieldKind::Str),
        FieldDecl::new("html_url", FieldKind::Str),
        FieldDecl::new("log_url", FieldKind::Str),
        FieldDecl::new("cluster_id", FieldKind::Int),
        FieldDecl::new("package_id", FieldKind::Int),
        FieldDecl::new("owner_id", FieldKind::Int),
        FieldDecl::new("outputs_count", FieldKind::Int),
        FieldDecl::new("runtime_in_seconds", FieldKind::Int),
        FieldDecl::new("progress", FieldKind::Float),
        FieldDecl::new("created_at", FieldKind::DateTime),
        FieldDecl::new("started_at", FieldKind::DateTime),
        FieldDecl::new("updated_at", FieldKind::DateTime),
        FieldDecl::new("failed_at", FieldKind::DateTime),
        FieldDecl::new("completed_at", FieldKind::DateTime),
        FieldDecl::new("variables", FieldKind::Dict),
        FieldDecl::new("dynamic_variables", FieldKind::Dict),
        FieldDecl::new("outputs", FieldKind::ObjectList(&OUTPUT_SCHEMA)),
        FieldDecl::new("cluster", FieldKind::Object(&CLUSTER_SCHEMA)),
        FieldDecl::new("creator", FieldKind::Object(&CREATOR_SCHEMA)),
    ],
    primary_keys: &["id"],
};

/// The component that produced a job output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Component name, unique within a package.
    pub name: String,

    /// Component type (e.g. "s3_destination").
    #[serde(rename = "type")]
    pub component_type: String,

    /// Output schema fields, passed through as-is.
    pub fields: Option<Vec<Value>>,
}

impl Resource for Component {
    fn schema() -> &'static Schema {
        &COMPONENT_SCHEMA
    }

    fn from_record(mut r: Record) -> Self {
        Self {
            name: r.take("name").into_str(),
            component_type: r.take("type").into_str(),
            fields: r.take("fields").into_list(),
        }
    }

    fn identity(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

/// A dataset written by a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    pub id: Option<i64>,
    pub name: String,

    /// Number of records written.
    pub records_count: Option<i64>,

    /// Number of bytes written.
    pub bytes_count: Option<i64>,

    pub preview_url: String,
    pub url: String,
    pub preview_type: String,

    /// Storage path of the output.
    pub path: String,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub can_preview: Option<bool>,
    pub can_download: Option<bool>,

    /// The destination component that wrote this output.
    pub component: Option<Component>,
}

impl Resource for Output {
    fn schema() -> &'static Schema {
        &OUTPUT_SCHEMA
    }

    fn from_record(mut r: Record) -> Self {
        Self {
            id: r.take("id").into_int(),
            name: r.take("name").into_str(),
            records_count: r.take("records_count").into_int(),
            bytes_count: r.take("bytes_count").into_int(),
            preview_url: r.take("preview_url").into_str(),
            url: r.take("url").into_str(),
            preview_type: r.take("preview_type").into_str(),
            path: r.take("path").into_str(),
            created_at: r.take("created_at").into_datetime(),
            updated_at: r.take("updated_at").into_datetime(),
            can_preview: r.take("can_preview").into_bool(),
            can_download: r.take("can_download").into_bool(),
            component: r.take("component").into_record().map(Component::from_record),
        }
    }

    fn identity(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

/// The user or schedule that started a job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Creator {
    pub id: Option<i64>,

    /// Creator kind, "User" or "Schedule".
    #[serde(rename = "type")]
    pub creator_type: String,

    pub url: String,
    pub html_url: String,
    pub display_name: String,
}

impl Resource for Creator {
    fn schema() -> &'static Schema {
        &CREATOR_SCHEMA
    }

    fn from_record(mut r: Record) -> Self {
        Self {
            id: r.take("id").into_int(),
            creator_type: r.take("type").into_str(),
            url: r.take("url").into_str(),
            html_url: r.take("html_url").into_str(),
            display_name: r.take("display_name").into_str(),
        }
    }

    fn identity(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

/// An Xplenty job: one run of a package on a cluster.
///
/// Jobs fetched from the API carry their cluster, creator and outputs as
/// fully built nested values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    /// Job ID.
    pub id: Option<i64>,

    /// Job status (e.g. "idle", "running", "completed", "failed").
    pub status: String,

    /// Error text reported by the run.
    pub errors: String,

    pub url: String,
    pub html_url: String,

    /// URL of the job's log.
    pub log_url: String,

    pub cluster_id: Option<i64>,
    pub package_id: Option<i64>,
    pub owner_id: Option<i64>,
    pub outputs_count: Option<i64>,
    pub runtime_in_seconds: Option<i64>,

    /// Completion ratio between 0.0 and 1.0.
    pub progress: Option<f64>,

    pub created_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Package variables the job ran with.
    pub variables: Option<Map<String, Value>>,

    /// Dynamic package variables the job ran with.
    pub dynamic_variables: Option<Map<String, Value>>,

    /// Outputs in the order the API listed them.
    pub outputs: Option<Vec<Output>>,

    pub cluster: Option<Cluster>,
    pub creator: Option<Creator>,

    #[serde(skip)]
    pub(crate) context: Context,
}

impl Resource for Job {
    fn schema() -> &'static Schema {
        &JOB_SCHEMA
    }

    fn from_record(mut r: Record) -> Self {
        Self {
            id: r.take("id").into_int(),
            status: r.take("status").into_str(),
            errors: r.take("errors").into_str(),
            url: r.take("url").into_str(),
            html_url: r.take("html_url").into_str(),
            log_url: r.take("log_url").into_str(),
            cluster_id: r.take("cluster_id").into_int(),
            package_id: r.take("package_id").into_int(),
            owner_id: r.take("owner_id").into_int(),
            outputs_count: r.take("outputs_count").into_int(),
            runtime_in_seconds: r.take("runtime_in_seconds").into_int(),
            progress: r.take("progress").into_float(),
            created_at: r.take("created_at").into_datetime(),
            started_at: r.take("started_at").into_datetime(),
            updated_at: r.take("updated_at").into_datetime(),
            failed_at: r.take("failed_at").into_datetime(),
            completed_at: r.take("completed_at").into_datetime(),
            variables: r.take("variables").into_dict(),
            dynamic_variables: r.take("dynamic_variables").into_dict(),
            outputs: r
                .take("outputs")
                .into_records()
                .map(|records| records.into_iter().map(Output::from_record).collect()),
            cluster: r.take("cluster").into_record().map(Cluster::from_record),
            creator: r.take("creator").into_record().map(Creator::from_record),
            context: r.context().clone(),
        }
    }

    fn identity(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

impl Job {
    /// The client this job was fetched with, if any.
    pub fn client(&self) -> Option<&XplentyClient> {
        self.context.client()
    }

    /// Outputs of the job, empty if the API reported none.
    pub fn outputs(&self) -> &[Output] {
        self.outputs.as_deref().unwrap_or_default()
    }

    /// Check if the job reached a final state.
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "failed" | "stopped")
    }

    /// Fetch the current state of this job.
    pub async fn refresh(&self) -> Result<Job> {
        let (client, id) = attachment("Job", &self.context, self.id)?;
        Job::get(client, id).await
    }

    /// Stop this job.
    ///
    /// # Errors
    ///
    /// Returns [`XplentyError::Detached`](crate::XplentyError::Detached) if
    /// the job was not built by a client, or the request error.
    pub async fn stop(&self) -> Result<Job> {
        let (client, id) = attachment("Job", &self.context, self.id)?;
        Job::delete(client, id).await
    }
}

/// Parameters for running a package as a job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobCreateParams {
    /// Cluster to run on.
    pub cluster_id: i64,
    /// Package to run.
    pub package_id: i64,
    /// Package variables.
    pub variables: BTreeMap<String, String>,
    /// Package variables evaluated at run time.
    pub dynamic_variables: BTreeMap<String, String>,
}

impl JobCreateParams {
    pub fn new(cluster_id: i64, package_id: i64) -> Self {
        Self {
            cluster_id,
            package_id,
            ..Default::default()
        }
    }

    /// Set a package variable.
    #[must_use]
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Set a dynamic package variable.
    #[must_use]
    pub fn dynamic_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dynamic_variables.insert(name.into(), value.into());
        self
    }

    /// Form fields in the bracketed layout the API expects. The API names
    /// the package `job_id`.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut form = vec![
            ("job[cluster_id]".to_string(), self.cluster_id.to_string()),
            ("job[job_id]".to_string(), self.package_id.to_string()),
        ];
        form.extend(
            self.variables
                .iter()
                .map(|(k, v)| (format!("job[variables][{k}]"), v.clone())),
        );
        form.extend(
            self.dynamic_variables
                .iter()
                .map(|(k, v)| (format!("job[dynamic_variables][{k}]"), v.clone())),
        );
        form
    }
}

#[async_trait]
impl Get for Job {
    type Id = i64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &XplentyClient, id: i64) -> Result<Self> {
        let value = client.get(&format!("jobs/{id}")).await?;
        Job::from_raw(&value, Some(client))
    }
}

#[async_trait]
impl List for Job {
    type Query = ListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &XplentyClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let value = client
            .get_with_query("jobs", &query.to_pairs(offset, limit))
            .await?;
        let jobs = Job::from_raw_list(&value, Some(client))?;
        Ok(Page::new(jobs, offset, limit))
    }
}

#[async_trait]
impl Create for Job {
    type Params = JobCreateParams;

    #[tracing::instrument(skip(client))]
    async fn create(client: &XplentyClient, params: Self::Params) -> Result<Self> {
        let value = client.post("jobs", &params.to_form()).await?;
        Job::from_raw(&value, Some(client))
    }
}

#[async_trait]
impl Delete for Job {
    type Id = i64;

    #[tracing::instrument(skip(client))]
    async fn delete(client: &XplentyClient, id: i64) -> Result<Self> {
        let value = client.delete(&format!("jobs/{id}")).await?;
        Job::from_raw(&value, Some(client))
    }
}
