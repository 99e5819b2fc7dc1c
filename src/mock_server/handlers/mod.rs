//! HTTP request handlers for the mock server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod account;
pub mod clusters;
pub mod jobs;
pub mod packages;
pub mod schedules;

pub use account::*;
pub use clusters::*;
pub use jobs::*;
pub use packages::*;
pub use schedules::*;

/// Offset pagination and status filter shared by list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<String>,
}

impl ListParams {
    /// Slice one page out of `items`.
    pub(crate) fn page<'a, T: Serialize>(&self, items: Vec<&'a T>) -> Json<Vec<&'a T>> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(crate::DEFAULT_PAGE_SIZE as usize);
        Json(items.into_iter().skip(offset).take(limit).collect())
    }
}

/// The API's error body: a JSON object with a `message`.
pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let message = message.into();
    (status, Json(json!({"error": status.canonical_reason(), "message": message}))).into_response()
}

pub(crate) fn not_found(kind: &str, id: i64) -> Response {
    error(StatusCode::NOT_FOUND, format!("{kind} {id} not found"))
}
