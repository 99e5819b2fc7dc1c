//! Schedule model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::XplentyClient;
use crate::error::Result;
use crate::mapper::{Context, FieldDecl, FieldKind, Record, Schema};
use crate::pagination::{ListQuery, Page};
use crate::traits::{Get, List};

use super::Resource;

/// Field layout of a schedule payload.
pub static SCHEDULE_SCHEMA: Schema = Schema {
    model: "Schedule",
    fields: &[
        FieldDecl::new("id", FieldKind::Int),
        FieldDecl::new("name", FieldKind::Str),
        FieldDecl::new("description", FieldKind::Str),
        FieldDecl::new("url", FieldKind::Str),
        FieldDecl::new("html_url", FieldKind::Str),
        FieldDecl::new("status", FieldKind::Str),
        FieldDecl::new("interval_unit", FieldKind::Str),
        FieldDecl::new("last_run_status", FieldKind::Str),
        FieldDecl::new("owner_id", FieldKind::Int),
        FieldDecl::new("interval_amount", FieldKind::Int),
        FieldDecl::new("execution_count", FieldKind::Int),
        FieldDecl::new("created_at", FieldKind::DateTime),
        FieldDecl::new("updated_at", FieldKind::DateTime),
        FieldDecl::new("start_at", FieldKind::DateTime),
        FieldDecl::new("next_run_at", FieldKind::DateTime),
        FieldDecl::new("last_run_at", FieldKind::DateTime),
        FieldDecl::new("variables", FieldKind::Dict),
        FieldDecl::new("task", FieldKind::Dict),
    ],
    primary_keys: &["id"],
};

/// An Xplenty schedule: runs packages on a recurring interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub url: String,
    pub html_url: String,

    /// "enabled" or "disabled".
    pub status: String,

    /// Unit of the interval (e.g. "hours", "days").
    pub interval_unit: String,

    /// Status of the job started by the last run.
    pub last_run_status: String,

    pub owner_id: Option<i64>,

    /// Number of `interval_unit`s between runs.
    pub interval_amount: Option<i64>,

    /// Number of times the schedule has fired.
    pub execution_count: Option<i64>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub start_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub last_run_at: Option<DateTime<Utc>>,

    pub variables: Option<Map<String, Value>>,

    /// What the schedule runs: nodes, packages and their variables.
    pub task: Option<Map<String, Value>>,

    #[serde(skip)]
    pub(crate) context: Context,
}

impl Resource for Schedule {
    fn schema() -> &'static Schema {
        &SCHEDULE_SCHEMA
    }

    fn from_record(mut r: Record) -> Self {
        Self {
            id: r.take("id").into_int(),
            name: r.take("name").into_str(),
            description: r.take("description").into_str(),
            url: r.take("url").into_str(),
            html_url: r.take("html_url").into_str(),
            status: r.take("status").into_str(),
            interval_unit: r.take("interval_unit").into_str(),
            last_run_status: r.take("last_run_status").into_str(),
            owner_id: r.take("owner_id").into_int(),
            interval_amount: r.take("interval_amount").into_int(),
            execution_count: r.take("execution_count").into_int(),
            created_at: r.take("created_at").into_datetime(),
            updated_at: r.take("updated_at").into_datetime(),
            start_at: r.take("start_at").into_datetime(),
            next_run_at: r.take("next_run_at").into_datetime(),
            last_run_at: r.take("last_run_at").into_datetime(),
            variables: r.take("variables").into_dict(),
            task: r.take("task").into_dict(),
            context: r.context().clone(),
        }
    }

    fn identity(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

impl Schedule {
    /// The client this schedule was fetched with, if any.
    pub fn client(&self) -> Option<&XplentyClient> {
        self.context.client()
    }

    pub fn is_enabled(&self) -> bool {
        self.status == "enabled"
    }
}

#[async_trait]
impl Get for Schedule {
    type Id = i64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &XplentyClient, id: i64) -> Result<Self> {
        let value = client.get(&format!("schedules/{id}")).await?;
        Schedule::from_raw(&value, Some(client))
    }
}

#[async_trait]
impl List for Schedule {
    type Query = ListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &XplentyClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let value = client
            .get_with_query("schedules", &query.to_pairs(offset, limit))
            .await?;
        let schedules = Schedule::from_raw_list(&value, Some(client))?;
        Ok(Page::new(schedules, offset, limit))
    }
}
