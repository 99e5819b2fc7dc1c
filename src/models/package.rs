//! Package model and trait implementations.

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

/// Field layout of a package payload.
pub static PACKAGE_SCHEMA: Schema = Schema {
    model: "Package",
    fields: &[
        FieldDecl::new("id", FieldKind::Int),
        FieldDecl::new("name", FieldKind::Str),
        FieldDecl::new("description", FieldKind::Str),
        FieldDecl::new("url", FieldKind::Str),
        FieldDecl::new("html_url", FieldKind::Str),
        FieldDecl::new("status", FieldKind::Str),
        FieldDecl::new("owner_id", FieldKind::Int),
        FieldDecl::new("created_at", FieldKind::DateTime),
        FieldDecl::new("updated_at", FieldKind::DateTime),
        FieldDecl::new("variables", FieldKind::Dict),
    ],
    primary_keys: &["id"],
};

/// An Xplenty package: a data flow definition that jobs run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Package {
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub url: String,
    pub html_url: String,

    /// Package status ("active" or "archived").
    pub status: String,

    pub owner_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    /// Default variables, passed through as-is.
    pub variables: Option<Map<String, Value>>,

    #[serde(skip)]
    pub(crate) context: Context,
}

impl Resource for Package {
    fn schema() -> &'static Schema {
        &PACKAGE_SCHEMA
    }

    fn from_record(mut r: Record) -> Self {
        Self {
            id: r.take("id").into_int(),
            name: r.take("name").into_str(),
            description: r.take("description").into_str(),
            url: r.take("url").into_str(),
            html_url: r.take("html_url").into_str(),
            status: r.take("status").into_str(),
            owner_id: r.take("owner_id").into_int(),
            created_at: r.take("created_at").into_datetime(),
            updated_at: r.take("updated_at").into_datetime(),
            variables: r.take("variables").into_dict(),
            context: r.context().clone(),
        }
    }

    fn identity(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }
}

impl Package {
    /// The client this package was fetched with, if any.
    pub fn client(&self) -> Option<&XplentyClient> {
        self.context.client()
    }
}

#[async_trait]
impl Get for Package {
    type Id = i64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &XplentyClient, id: i64) -> Result<Self> {
        let value = client.get(&format!("packages/{id}")).await?;
        Package::from_raw(&value, Some(client))
    }
}

#[async_trait]
impl List for Package {
    type Query = ListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &XplentyClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>> {
        let value = client
            .get_with_query("packages", &query.to_pairs(offset, limit))
            .await?;
        let packages = Package::from_raw_list(&value, Some(client))?;
        Ok(Page::new(packages, offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_package_from_raw() {
        let package = Package::from_raw(
            &json!({
                "id": "31",
                "name": "daily_rollup",
                "status": "active",
                "owner_id": 3,
                "created_at": "2015-01-10 08:00:00",
                "variables": {"DAY": "CurrentDate()"}
            }),
            None,
        )
        .unwrap();

        assert_eq!(package.id, Some(31));
        assert_eq!(package.name, "daily_rollup");
        assert_eq!(package.description, "null");
        assert!(package.created_at.is_some());
        assert_eq!(package.updated_at, None);
        assert_eq!(
            package.variables.as_ref().and_then(|v| v.get("DAY")),
            Some(&json!("CurrentDate()"))
        );
        assert_eq!(package.to_string(), "<Package '31'>");
    }

    #[test]
    fn test_package_list_from_raw() {
        let packages =
            Package::from_raw_list(&json!([{"id": 1}, {"id": 2}, {"id": 3}]), None).unwrap();
        let ids: Vec<_> = packages.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_package_list_rejects_object() {
        let err = Package::from_raw_list(&json!({"id": 1}), None).unwrap_err();
        assert!(matches!(
            err,
            crate::XplentyError::UnexpectedPayload { model: "Package", .. }
        ));
    }
}
