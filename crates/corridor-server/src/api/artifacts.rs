//! Published artifact endpoints.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::output::{OVERLAY_ARTIFACT, ROUTE_ARTIFACT};
use crate::state::AppState;

/// Response header carrying the run that produced an artifact.
pub const RUN_ID_HEADER: &str = "x-corridor-run-id";

/// Last published offset route.
pub async fn offset_route(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    published(&state, ROUTE_ARTIFACT)
}

/// Last published full result, for map overlays.
pub async fn mission_overlay(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    published(&state, OVERLAY_ARTIFACT)
}

fn published(state: &AppState, name: &str) -> Result<impl IntoResponse, StatusCode> {
    let artifact = state.artifact(name).ok_or(StatusCode::NOT_FOUND)?;
    tracing::debug!(
        "Serving {} from run {} (published {})",
        name,
        artifact.run_id,
        artifact.published_at.to_rfc3339()
    );
    Ok(([(RUN_ID_HEADER, artifact.run_id)], Json(artifact.body)))
}
