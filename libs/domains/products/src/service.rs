use std::sync::Arc;

use crate::error::{ProductError, ProductResult};
use crate::models::{self, CreateProduct, Product, ProductId, UpdateProduct};
use crate::repository::{ProductRepository, UpdateOutcome};

/// Service layer for Product business logic
///
/// Validates payloads, stamps timestamps and turns repository outcomes into
/// results. Validation always runs before the store is touched.
#[derive(Clone)]
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Validate, insert and return the stored product.
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        let new_product = input.into_new_product(models::now())?;
        let id = self.repository.insert(new_product.clone()).await?;
        Ok(new_product.with_id(id))
    }

    pub async fn get_product(&self, id: ProductId) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound)
    }

    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        self.repository.list_all().await
    }

    /// Apply a partial update.
    ///
    /// `Ok(None)` means the payload named no fields; the store is not
    /// consulted, so this holds for unknown ids too.
    pub async fn update_product(
        &self,
        id: ProductId,
        input: UpdateProduct,
    ) -> ProductResult<Option<Product>> {
        let changes = input.into_changes()?;
        if changes.is_empty() {
            return Ok(None);
        }

        match self.repository.update(id, changes, models::now()).await? {
            UpdateOutcome::Updated(product) => Ok(Some(product)),
            UpdateOutcome::NothingToUpdate => Ok(None),
            UpdateOutcome::NotFound => Err(ProductError::NotFound),
        }
    }

    pub async fn delete_product(&self, id: ProductId) -> ProductResult<()> {
        if !self.repository.delete(id).await? {
            return Err(ProductError::NotFound);
        }

        Ok(())
    }
}
