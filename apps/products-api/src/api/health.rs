//! Readiness check

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_helpers::{run_health_checks, HealthCheckFuture};
use database::postgres::check_health;
use serde_json::Value;

use crate::state::AppState;

/// Readiness check: 503 while the database cannot be reached.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Ready to serve", content_type = "application/json",
            example = json!({"status": "ready", "database": "connected"})),
        (status = 503, description = "A dependency is unavailable",
            content_type = "application/json",
            example = json!({"status": "not ready", "database": "disconnected"}))
    )
)]
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database: HealthCheckFuture<'_> =
        Box::pin(async { check_health(&state.db).await.map_err(|e| e.to_string()) });

    run_health_checks(vec![("database", database)]).await
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
