//! Account endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::error;
use crate::mock_server::state::SharedState;

/// GET /:account/api/rate_limit_status
pub async fn rate_limit_status(State(state): State<SharedState>) -> Response {
    let state = state.read().await;
    match &state.limits {
        Some(limits) => Json(json!({ "limits": limits })).into_response(),
        None => error(StatusCode::NOT_FOUND, "no rate limit configured"),
    }
}
