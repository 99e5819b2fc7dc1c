//! Xplenty API model types.
//!
//! Each model pairs a static [`Schema`] with a plain struct holding one
//! typed slot per declared field. Instances are built through
//! [`Resource::from_raw`], which runs the payload through the mapper.

use serde_json::Value;

use crate::client::XplentyClient;
use crate::error::{Result, XplentyError};
use crate::mapper::{Context, Record, Schema};

mod account;
mod cluster;
mod job;
mod package;
mod schedule;

pub use account::*;
pub use cluster::*;
pub use job::*;
pub use package::*;
pub use schedule::*;

/// A typed resource built from a raw API payload.
pub trait Resource: Sized {
    /// The model's field layout.
    fn schema() -> &'static Schema;

    /// Move the coerced values out of a record built with [`Self::schema`].
    fn from_record(record: Record) -> Self;

    /// The instance's identity, taken from its first primary key. `None`
    /// for models without one.
    fn identity(&self) -> Option<String>;

    /// Build an instance from a decoded JSON object.
    ///
    /// `client` is attached as the instance's context so that convenience
    /// methods like [`Cluster::refresh`] can reach the API.
    ///
    /// # Errors
    ///
    /// Returns [`XplentyError::UnexpectedPayload`] if `raw` is not an
    /// object. Fields that fail coercion become "no value" instead.
    fn from_raw(raw: &Value, client: Option<&XplentyClient>) -> Result<Self> {
        Record::from_raw(Self::schema(), raw, Context::from(client)).map(Self::from_record)
    }

    /// Build one instance per element of a decoded JSON array, in order.
    ///
    /// # Errors
    ///
    /// Returns [`XplentyError::UnexpectedPayload`] if `raw` is not an array
    /// or one of its elements is not an object.
    fn from_raw_list(raw: &Value, client: Option<&XplentyClient>) -> Result<Vec<Self>> {
        let items = raw.as_array().ok_or(XplentyError::UnexpectedPayload {
            model: Self::schema().model,
            expected: "a JSON array",
        })?;
        items.iter().map(|item| Self::from_raw(item, client)).collect()
    }
}

/// Resolve the client and id a convenience method needs.
pub(crate) fn attachment<'a>(
    model: &'static str,
    context: &'a Context,
    id: Option<i64>,
) -> Result<(&'a XplentyClient, i64)> {
    let client = context.client().ok_or(XplentyError::Detached { model })?;
    let id = id.ok_or(XplentyError::MissingId { model })?;
    Ok((client, id))
}

macro_rules! impl_resource_display {
    ($($model:ty),* $(,)?) => {
        $(
            impl std::fmt::Display for $model {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    let model = <$model as Resource>::schema().model;
                    match self.identity() {
                        Some(id) => write!(f, "<{} '{}'>", model, id),
                        None => write!(f, "<{}>", model),
                    }
                }
            }
        )*
    };
}

impl_resource_display!(AccountLimits, Cluster, Component, Creator, Job, Output, Package, Schedule);
