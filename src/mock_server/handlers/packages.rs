//! Package endpoint handlers.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::{not_found, ListParams};
use crate::mock_server::state::SharedState;

/// GET /:account/api/packages
pub async fn list_packages(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    let packages: Vec<_> = state
        .packages
        .values()
        .filter(|p| params.status.as_deref().map(|s| p.status == s).unwrap_or(true))
        .collect();
    params.page(packages).into_response()
}

/// GET /:account/api/packages/:id
pub async fn get_package(
    State(state): State<SharedState>,
    Path((_account, id)): Path<(String, i64)>,
) -> Response {
    let state = state.read().await;
    match state.packages.get(&id) {
        Some(package) => Json(package).into_response(),
        None => not_found("package", id),
    }
}
