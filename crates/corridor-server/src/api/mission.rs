//! Mission relay and compute trigger endpoints.
//!
//! The relay keeps the last mission it was given. `/compute-route` plans an
//! offset corridor for that mission on a blocking worker and publishes the
//! result as artifacts. `/process-route` does the same and also returns the
//! planned route points in its reply.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use corridor_core::{CorridorError, InputValidationError, MissionDescriptor, OffsetRouteResult};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::output::OutputError;
use crate::state::AppState;

/// Store a new mission.
pub async fn update_mission(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mission = match parse_mission(body) {
        Ok(mission) => mission,
        Err(rejection) => return rejection,
    };

    let stored = state.replace_mission(mission).await;
    tracing::info!(
        "Mission updated with {} route points",
        stored.mission.route_points.len()
    );

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "message": "Mission updated",
            "updatedRoutePoints": stored.mission.route_points,
            "updatedAt": stored.updated_at,
        })),
    )
}

/// Return the stored mission.
pub async fn get_mission(State(state): State<Arc<AppState>>) -> Json<MissionDescriptor> {
    Json(state.current_mission().await.mission)
}

/// Replace the stored mission and echo it back.
pub async fn replace_mission(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mission = match parse_mission(body) {
        Ok(mission) => mission,
        Err(rejection) => return rejection,
    };

    let stored = state.replace_mission(mission).await;
    tracing::info!(
        "Mission replaced with {} route points",
        stored.mission.route_points.len()
    );
    (StatusCode::OK, Json(json!(stored.mission)))
}

fn parse_mission(body: Value) -> Result<MissionDescriptor, (StatusCode, Json<Value>)> {
    MissionDescriptor::from_value(body).map_err(|e| {
        tracing::warn!("Rejected mission: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"status": "error", "message": e.to_string()})),
        )
    })
}

#[derive(Debug, Error)]
enum ComputeError {
    #[error(transparent)]
    Corridor(#[from] CorridorError),
    #[error(transparent)]
    Publish(#[from] OutputError),
    #[error("compute worker failed: {0}")]
    Worker(String),
}

impl ComputeError {
    fn status(&self) -> StatusCode {
        match self {
            ComputeError::Corridor(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Compute and publish the offset route for the stored mission.
///
/// Body: `{"offset": <meters>}`; an empty body or a missing offset uses the
/// configured default.
pub async fn compute_route(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let run_id = Uuid::new_v4().to_string();
    match run_compute(&state, &body, &run_id).await {
        Ok(result) => (StatusCode::OK, Json(summary(&result, &run_id))),
        Err(e) => compute_failed(&run_id, e),
    }
}

/// Like [`compute_route`], but the reply also carries `routePoints`, the
/// published offset route.
pub async fn process_route(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let run_id = Uuid::new_v4().to_string();
    match run_compute(&state, &body, &run_id).await {
        Ok(result) => {
            let mut reply = summary(&result, &run_id);
            reply["routePoints"] = json!(result.route);
            (StatusCode::OK, Json(reply))
        }
        Err(e) => compute_failed(&run_id, e),
    }
}

fn summary(result: &OffsetRouteResult, run_id: &str) -> Value {
    json!({
        "success": true,
        "points": result.stats.final_points,
        "degradedPoints": result.stats.degraded_points,
        "runId": run_id,
    })
}

fn compute_failed(run_id: &str, e: ComputeError) -> (StatusCode, Json<Value>) {
    let status = e.status();
    if status.is_server_error() {
        tracing::error!("Run {} failed: {}", run_id, e);
    } else {
        tracing::warn!("Run {} rejected: {}", run_id, e);
    }
    (status, Json(json!({"success": false, "error": e.to_string()})))
}

async fn run_compute(
    state: &Arc<AppState>,
    body: &[u8],
    run_id: &str,
) -> Result<OffsetRouteResult, ComputeError> {
    let offset =
        parse_offset(body, state.config().default_offset).map_err(CorridorError::from)?;
    let config = state.config().corridor_config(offset);
    config.validate().map_err(CorridorError::from)?;

    let mission = state.current_mission().await.mission;
    tracing::info!("Run {}: computing offset route with {} m clearance", run_id, offset);

    let worker_state = state.clone();
    let worker_run_id = run_id.to_string();
    tokio::task::spawn_blocking(move || -> Result<OffsetRouteResult, ComputeError> {
        let result = mission.compute(&config)?;
        worker_state.publish(&worker_run_id, &result)?;
        Ok(result)
    })
    .await
    .map_err(|e| ComputeError::Worker(e.to_string()))?
}

/// Offset from a `{"offset": ...}` body. Numeric strings are accepted.
fn parse_offset(body: &[u8], default: f64) -> Result<f64, InputValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(default);
    }
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| InputValidationError::Malformed(e.to_string()))?;
    if !value.is_object() {
        return Err(InputValidationError::Malformed(
            "compute request must be a JSON object".to_string(),
        ));
    }

    match value.get("offset") {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| InputValidationError::InvalidOffset(n.to_string())),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| InputValidationError::InvalidOffset(format!("`{}` is not a number", s))),
        Some(other) => Err(InputValidationError::InvalidOffset(format!(
            "`{}` is not a number",
            other
        ))),
    }
}
