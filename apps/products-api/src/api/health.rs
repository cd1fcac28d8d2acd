//! Readiness endpoint

use axum::{Router, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::mongodb::check_health;

use crate::state::AppState;

async fn ready(state: AppState) -> impl IntoResponse {
    let checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "database",
        Box::pin(async {
            if check_health(&state.mongo_client).await {
                Ok(())
            } else {
                Err("MongoDB ping failed".to_string())
            }
        }),
    )];

    run_health_checks(checks).await
}

/// `/ready` answers 200 only while MongoDB responds to `ping`.
pub fn router(state: AppState) -> Router {
    Router::new().route("/ready", get(move || ready(state.clone())))
}
