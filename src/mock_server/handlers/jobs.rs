//! Job endpoint handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};

use super::{error, not_found, ListParams};
use crate::mock_server::state::SharedState;

/// GET /:account/api/jobs
pub async fn list_jobs(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    params
        .page(state.list_jobs(params.status.as_deref()))
        .into_response()
}

/// GET /:account/api/jobs/:id
pub async fn get_job(
    State(state): State<SharedState>,
    Path((_account, id)): Path<(String, i64)>,
) -> Response {
    let state = state.read().await;
    match state.jobs.get(&id) {
        Some(job) => Json(job).into_response(),
        None => not_found("job", id),
    }
}

/// POST /:account/api/jobs
pub async fn create_job(
    State(state): State<SharedState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut state = state.write().await;
    match state.create_job(&form) {
        Ok(job) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(message) => error(StatusCode::UNPROCESSABLE_ENTITY, message),
    }
}

/// DELETE /:account/api/jobs/:id
pub async fn stop_job(
    State(state): State<SharedState>,
    Path((_account, id)): Path<(String, i64)>,
) -> Response {
    let mut state = state.write().await;
    match state.stop_job(id) {
        Some(job) => Json(job).into_response(),
        None => not_found("job", id),
    }
}
