//! OpenAPI documentation configuration

use axum_helpers::HealthResponse;
use utoipa::OpenApi;

/// Combined OpenAPI documentation for the product service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Product Service API",
        version = "0.1.0",
        description = "Product management API",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8002", description = "Local development server")
    ),
    paths(
        axum_helpers::server::health::health_handler,
        crate::api::health::ready,
    ),
    components(schemas(HealthResponse)),
    nest(
        (path = "/api/products", api = domain_products::ApiDoc)
    ),
    tags(
        (name = "health", description = "Liveness and readiness checks")
    )
)]
pub struct ApiDoc;
