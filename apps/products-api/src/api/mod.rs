//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::health_router;

use crate::state::AppState;

/// Routes nested under `/api`
pub fn routes(state: &AppState) -> Router {
    Router::new().nest("/products", products::router(state))
}

/// Health routes mounted at the root: `/health` and `/ready`
pub fn health_routes(state: &AppState) -> Router {
    health_router(state.config.app.clone()).merge(health::router(state.clone()))
}
