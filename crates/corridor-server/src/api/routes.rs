//! REST API routes.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::{artifacts, mission};
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new()
        // Mission relay
        .route("/update-mission", post(mission::update_mission))
        .route(
            "/get-mission",
            get(mission::get_mission).post(mission::replace_mission),
        )
        // Compute trigger
        .route("/compute-route", post(mission::compute_route))
        .route("/process-route", post(mission::process_route))
        // Published artifacts
        .route("/offset_route.json", get(artifacts::offset_route))
        .route("/mission_overlay.json", get(artifacts::mission_overlay))
}
