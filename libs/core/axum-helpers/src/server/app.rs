use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::{cors::cors_layer_from_env, security::security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Assemble the service router.
///
/// - `apis` is nested under `/api` (state already applied)
/// - `health` routes (e.g. `/health`, `/ready`) are mounted at the root
/// - Swagger UI at `/swagger-ui`, OpenAPI JSON at `/api-docs/openapi.json`
/// - JSON 404/405 fallbacks
/// - request tracing, security headers, CORS (see [`cors_layer_from_env`]) and compression
///
/// # Errors
/// Fails when `CORS_ALLOWED_ORIGIN` holds an invalid origin.
///
/// # Example
/// ```ignore
/// let api = Router::new().nest("/products", handlers::router(service));
/// let router = create_router::<ApiDoc>(api, health_router(app_info!()))?;
/// ```
pub fn create_router<T>(apis: Router, health: Router) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(health)
        .nest("/api", apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer_from_env()?)
        .layer(CompressionLayer::new());

    Ok(router)
}

/// Serve `router` until SIGINT/SIGTERM, then drain and clean up.
///
/// In-flight requests finish before `serve` returns; `cleanup` (closing the
/// database pool) runs afterwards and is abandoned after `shutdown_timeout`.
///
/// # Errors
/// Fails when the listener cannot bind or the server errors out.
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let coordinator = ShutdownCoordinator::new();

    let signal_handle = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.wait_for_signal().await })
    };

    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let graceful = {
        let coordinator = coordinator.clone();
        async move { coordinator.wait_for_shutdown().await }
    };

    let serve_result = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(graceful)
    .await
    .inspect_err(|e| tracing::error!("Server encountered an error: {:?}", e));

    signal_handle.abort();

    info!("Server stopped, running cleanup (timeout: {:?})", shutdown_timeout);
    match tokio::time::timeout(shutdown_timeout, cleanup).await {
        Ok(()) => info!("Cleanup completed successfully"),
        Err(_) => warn!(
            "Cleanup exceeded timeout of {:?}, forcing shutdown",
            shutdown_timeout
        ),
    }

    serve_result
}
