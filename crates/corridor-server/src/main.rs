//! Corridor Server - mission relay and offset-route publisher

use anyhow::Result;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corridor_server::api;
use corridor_server::config::Config;
use corridor_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("corridor_server=debug".parse()?)
            .add_directive("corridor_core=info".parse()?))
        .init();

    tracing::info!("Starting Corridor Server...");

    let config = Config::from_env();
    let port = config.server_port;
    tracing::info!(
        "Publishing artifacts to {} (default offset {} m, UTM zone {})",
        config.output_dir.display(),
        config.default_offset,
        config.utm_zone
    );
    let state = Arc::new(AppState::new(config));

    let app = api::routes()
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
