use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProductResult;
use crate::models::{NewProduct, Product, ProductChanges, ProductId};

/// Result of a partial update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(Product),
    /// The change set was empty; nothing was written.
    NothingToUpdate,
    NotFound,
}

/// Repository trait for Product persistence
///
/// Every call runs in its own transaction (or single statement); none is
/// kept open across calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product whose timestamps are already set; returns the new id
    async fn insert(&self, product: NewProduct) -> ProductResult<ProductId>;

    async fn get_by_id(&self, id: ProductId) -> ProductResult<Option<Product>>;

    /// All products, by id ascending
    async fn list_all(&self) -> ProductResult<Vec<Product>>;

    /// Apply `changes` and move `updated_at` forward from `now`
    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
        now: DateTime<Utc>,
    ) -> ProductResult<UpdateOutcome>;

    /// Returns whether a row was removed
    async fn delete(&self, id: ProductId) -> ProductResult<bool>;
}
