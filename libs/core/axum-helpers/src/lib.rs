//! # Axum Helpers
//!
//! Shared HTTP plumbing for the service binaries.
//!
//! ## Modules
//!
//! - **[`server`]**: router assembly, health checks, graceful shutdown
//! - **[`http`]**: CORS and security-header middleware
//! - **[`errors`]**: `AppError` and the `{"error": "..."}` response envelope
//! - **[`extractors`]**: JSON body extractors with envelope rejections
//! - **[`audit`]**: audit events for data modifications

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{
    cors_layer_from_env, create_cors_layer, create_permissive_cors_layer, security_headers,
};

pub use errors::{AppError, ErrorCode, ErrorResponse, error_response};

pub use extractors::{BODY_REQUIRED, JsonBody, NonEmptyJsonBody};

pub use audit::{AuditEvent, AuditOutcome, ClientContext};
