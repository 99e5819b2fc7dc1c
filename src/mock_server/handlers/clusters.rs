//! Cluster endpoint handlers.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};

use super::{error, not_found, ListParams};
use crate::mock_server::state::SharedState;

/// GET /:account/api/clusters
pub async fn list_clusters(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    params
        .page(state.list_clusters(params.status.as_deref()))
        .into_response()
}

/// GET /:account/api/clusters/:id
pub async fn get_cluster(
    State(state): State<SharedState>,
    Path((_account, id)): Path<(String, i64)>,
) -> Response {
    let state = state.read().await;
    match state.clusters.get(&id) {
        Some(cluster) => Json(cluster).into_response(),
        None => not_found("cluster", id),
    }
}

/// POST /:account/api/clusters
pub async fn create_cluster(
    State(state): State<SharedState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let mut state = state.write().await;
    match state.create_cluster(&form) {
        Ok(cluster) => (StatusCode::CREATED, Json(cluster)).into_response(),
        Err(message) => error(StatusCode::UNPROCESSABLE_ENTITY, message),
    }
}

/// DELETE /:account/api/clusters/:id
pub async fn terminate_cluster(
    State(state): State<SharedState>,
    Path((_account, id)): Path<(String, i64)>,
) -> Response {
    let mut state = state.write().await;
    match state.terminate_cluster(id) {
        Some(cluster) => Json(cluster).into_response(),
        None => not_found("cluster", id),
    }
}
