//! Products Domain
//!
//! Product records (name, price, stock) over HTTP, stored in PostgreSQL.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← axum endpoints, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← validation, timestamps
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + PostgreSQL implementation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← entity, payloads, id
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_products::{PgProductRepository, ProductService, handlers};
//! # fn build(db: sea_orm::DatabaseConnection) -> axum::Router {
//! let service = ProductService::new(PgProductRepository::new(db));
//! axum::Router::new().nest("/api/products", handlers::router(service))
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{Operation, ProductError, ProductResult};
pub use handlers::{ApiDoc, MessageResponse};
pub use models::{CreateProduct, NewProduct, Product, ProductChanges, ProductId, UpdateProduct};
pub use postgres::PgProductRepository;
pub use repository::{ProductRepository, UpdateOutcome};
pub use service::ProductService;
