//! API routes for the corridor server.

pub mod artifacts;
pub mod mission;
mod routes;

use axum::Router;

pub fn routes() -> Router<std::sync::Arc<crate::state::AppState>> {
    routes::create_router()
}
