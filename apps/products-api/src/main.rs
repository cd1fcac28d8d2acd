//! Products API - REST server over the products collection

use axum::Router;
use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::{connect_from_config, resolve_database};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Product routes, docs, middleware and health endpoints in one router.
fn build_router(state: &AppState) -> eyre::Result<Router> {
    let api_routes = api::routes(state);
    let router = create_router::<openapi::ApiDoc>(api_routes, &state.config.server)?;
    Ok(router.merge(health_router(state.config.app)))
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    // No listener is bound until the database answers
    let mongo_client = connect_from_config(&config.mongodb).await?;
    let db = resolve_database(&mongo_client, &config.mongodb);

    info!("Successfully connected to MongoDB database: {}", db.name());

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    let app = build_router(&state)?;

    info!(
        "Starting {} v{} on port {}",
        state.config.app.name, state.config.app.version, state.config.server.port
    );

    let server_config = state.config.server.clone();
    let mongo_client = state.mongo_client.clone();

    create_production_app(app, &server_config, SHUTDOWN_TIMEOUT, async move {
        info!("Shutting down: closing MongoDB connections");
        mongo_client.shutdown().await;
        info!("MongoDB connection closed");
    })
    .await?;

    info!("Products API shutdown complete");
    Ok(())
}
