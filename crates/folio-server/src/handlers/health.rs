//! Health check.

use crate::response::{HealthResponse, StoreReach};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

/// 200 when the store answers, 500 otherwise.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let reach = match state.store.projects.ping().await {
        Ok(()) => StoreReach::Connected,
        Err(err) => {
            warn!(error = %err, "store ping failed");
            StoreReach::Unreachable
        }
    };

    let body = HealthResponse::from_store(reach);
    let status = if body.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(body))
}
