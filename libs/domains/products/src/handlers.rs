use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, State},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::{
    AuditEvent, AuditOutcome, ClientContext, JsonBody, NonEmptyJsonBody,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::entity;
use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Product, ProductId, UpdateProduct};
use crate::repository::ProductRepository;
use crate::service::ProductService;

pub const NO_FIELDS_TO_UPDATE: &str = "No fields to update";
pub const PRODUCT_DELETED: &str = "Product deleted successfully";

/// Informational reply for requests that return no product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Product deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_product,
        update_product,
        delete_product,
    ),
    components(
        schemas(Product, CreateProduct, UpdateProduct, MessageResponse),
        responses(NotFoundResponse, BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = entity::Model::TAG, description = "Product management endpoints")
    )
)]
pub struct ApiDoc;

/// `{id}` path segment as a [`ProductId`].
///
/// Anything that is not a positive integer cannot have been issued, so it is
/// rejected as not found.
pub struct ProductIdPath(pub ProductId);

impl<S: Send + Sync> FromRequestParts<S> for ProductIdPath {
    type Rejection = ProductError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ProductError::NotFound)?;

        raw.parse()
            .map(ProductIdPath)
            .map_err(|_| ProductError::NotFound)
    }
}

/// Create the product router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(shared_service)
}

fn audit<T>(
    client: &ClientContext,
    action: &str,
    id: Option<ProductId>,
    result: &ProductResult<T>,
    details: Value,
) {
    let (outcome, details) = match result {
        Ok(_) => (AuditOutcome::Success, details),
        Err(e) => (AuditOutcome::Failure, json!({ "error": e.to_string() })),
    };

    AuditEvent::new(action, id.map(|id| format!("product:{id}")), outcome)
        .with_client(client)
        .with_details(details)
        .log();
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = entity::Model::TAG,
    responses(
        (status = 200, description = "All products, by id", body = Vec<Product>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Json<Vec<Product>>> {
    let products = service.list_products().await?;
    Ok(Json(products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = entity::Model::TAG,
    request_body = CreateProduct,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    client: ClientContext,
    NonEmptyJsonBody(input): NonEmptyJsonBody<CreateProduct>,
) -> ProductResult<impl IntoResponse> {
    let result = service.create_product(input).await;

    let id = result.as_ref().ok().map(|p| p.id);
    let details = match &result {
        Ok(p) => json!({ "name": p.name, "price": p.price, "stock": p.stock }),
        Err(_) => Value::Null,
    };
    audit(&client, "product.create", id, &result, details);

    Ok((StatusCode::CREATED, Json(result?)))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(
        ("id" = String, Path, description = "Product ID", example = "1")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    ProductIdPath(id): ProductIdPath,
) -> ProductResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Update some fields of a product
///
/// An empty object changes nothing and answers with a message instead of the
/// product.
#[utoipa::path(
    put,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(
        ("id" = String, Path, description = "Product ID", example = "1")
    ),
    request_body = UpdateProduct,
    responses(
        (status = 200, body = Product,
            description = "Updated product, or a message when no fields were given"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    client: ClientContext,
    ProductIdPath(id): ProductIdPath,
    JsonBody(input): JsonBody<UpdateProduct>,
) -> ProductResult<Response> {
    let result = service.update_product(id, input).await;

    match &result {
        Ok(None) => {}
        Ok(Some(p)) => audit(
            &client,
            "product.update",
            Some(id),
            &result,
            json!({ "name": p.name, "price": p.price, "stock": p.stock }),
        ),
        Err(_) => audit(&client, "product.update", Some(id), &result, Value::Null),
    }

    Ok(match result? {
        Some(product) => Json(product).into_response(),
        None => Json(MessageResponse::new(NO_FIELDS_TO_UPDATE)).into_response(),
    })
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = entity::Model::TAG,
    params(
        ("id" = String, Path, description = "Product ID", example = "1")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    client: ClientContext,
    ProductIdPath(id): ProductIdPath,
) -> ProductResult<Json<MessageResponse>> {
    let result = service.delete_product(id).await;
    audit(&client, "product.delete", Some(id), &result, Value::Null);

    result?;
    Ok(Json(MessageResponse::new(PRODUCT_DELETED)))
}
