//! Schedule endpoint handlers.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::{not_found, ListParams};
use crate::mock_server::state::SharedState;

/// GET /:account/api/schedules
pub async fn list_schedules(
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Response {
    let state = state.read().await;
    let schedules: Vec<_> = state
        .schedules
        .values()
        .filter(|s| params.status.as_deref().map(|want| s.status == want).unwrap_or(true))
        .collect();
    params.page(schedules).into_response()
}

/// GET /:account/api/schedules/:id
pub async fn get_schedule(
    State(state): State<SharedState>,
    Path((_account, id)): Path<(String, i64)>,
) -> Response {
    let state = state.read().await;
    match state.schedules.get(&id) {
        Some(schedule) => Json(schedule).into_response(),
        None => not_found("schedule", id),
    }
}
