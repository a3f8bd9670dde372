use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, QuerySelect,
    TransactionTrait,
};

use crate::{
    entity,
    error::{Operation, ProductError, ProductResult},
    models::{NewProduct, Product, ProductChanges, ProductId, next_updated_at},
    repository::{ProductRepository, UpdateOutcome},
};

/// PostgreSQL-backed [`ProductRepository`].
///
/// Writes run in a transaction that is committed explicitly; returning early
/// drops the guard, which rolls it back.
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, product: NewProduct) -> ProductResult<ProductId> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(ProductError::database(Operation::Create))?;
        let active_model: entity::ActiveModel = product.into();
        let model = active_model
            .insert(&txn)
            .await
            .map_err(ProductError::database(Operation::Create))?;
        txn.commit()
            .await
            .map_err(ProductError::database(Operation::Create))?;

        tracing::info!(product_id = model.id, "Created product");
        Ok(ProductId::new(model.id))
    }

    async fn get_by_id(&self, id: ProductId) -> ProductResult<Option<Product>> {
        let model = entity::Entity::find_by_id(id.value())
            .one(&self.db)
            .await
            .map_err(ProductError::database(Operation::Fetch))?;

        Ok(model.map(Into::into))
    }

    async fn list_all(&self) -> ProductResult<Vec<Product>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(ProductError::database(Operation::List))?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
        now: DateTime<Utc>,
    ) -> ProductResult<UpdateOutcome> {
        if changes.is_empty() {
            return Ok(UpdateOutcome::NothingToUpdate);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(ProductError::database(Operation::Update))?;

        // Row lock so concurrent writers serialize on updated_at.
        let Some(model) = entity::Entity::find_by_id(id.value())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(ProductError::database(Operation::Update))?
        else {
            return Ok(UpdateOutcome::NotFound);
        };

        let updated_at = next_updated_at(model.updated_at.to_utc(), now);
        let fields = changes.field_names();

        let mut active_model = model.into_active_model();
        if let Some(name) = changes.name {
            active_model.name = Set(name);
        }
        if let Some(price) = changes.price {
            active_model.price = Set(price);
        }
        if let Some(stock) = changes.stock {
            active_model.stock = Set(stock);
        }
        active_model.updated_at = Set(updated_at.into());

        let updated = active_model
            .update(&txn)
            .await
            .map_err(ProductError::database(Operation::Update))?;
        txn.commit()
            .await
            .map_err(ProductError::database(Operation::Update))?;

        tracing::info!(product_id = %id, ?fields, "Updated product");
        Ok(UpdateOutcome::Updated(updated.into()))
    }

    async fn delete(&self, id: ProductId) -> ProductResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(ProductError::database(Operation::Delete))?;
        let result = entity::Entity::delete_by_id(id.value())
            .exec(&txn)
            .await
            .map_err(ProductError::database(Operation::Delete))?;
        txn.commit()
            .await
            .map_err(ProductError::database(Operation::Delete))?;

        if result.rows_affected > 0 {
            tracing::info!(product_id = %id, "Deleted product");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now;
    use chrono::TimeDelta;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult};

    fn model(id: i64, stamp: DateTime<Utc>) -> entity::Model {
        entity::Model {
            id,
            name: "Widget".to_string(),
            price: 9.99,
            stock: 100,
            created_at: stamp.into(),
            updated_at: stamp.into(),
        }
    }

    fn mock() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    #[tokio::test]
    async fn test_insert_returns_store_assigned_id() {
        let t = now();
        let db = mock().append_query_results([vec![model(1, t)]]).into_connection();
        let repo = PgProductRepository::new(db);

        let id = repo
            .insert(NewProduct {
                name: "Widget".into(),
                price: 9.99,
                stock: 100,
                created_at: t,
                updated_at: t,
            })
            .await
            .unwrap();

        assert_eq!(id, ProductId::new(1));
    }

    #[tokio::test]
    async fn test_insert_failure_is_create_error() {
        let db = mock()
            .append_query_errors([DbErr::Custom("constraint violated".into())])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let t = now();
        let err = repo
            .insert(NewProduct {
                name: "Widget".into(),
                price: 1.0,
                stock: 1,
                created_at: t,
                updated_at: t,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProductError::Database {
                operation: Operation::Create,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_get_by_id_found_and_missing() {
        let t = now();
        let db = mock()
            .append_query_results([vec![model(3, t)], vec![]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let found = repo.get_by_id(ProductId::new(3)).await.unwrap().unwrap();
        assert_eq!(found.id, ProductId::new(3));
        assert_eq!(found.created_at, t);

        assert!(repo.get_by_id(ProductId::new(4)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_all_maps_rows_in_order() {
        let t = now();
        let db = mock()
            .append_query_results([vec![model(1, t), model(2, t)]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let ids: Vec<_> = repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id.value())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_list_all_failure_is_list_error() {
        let db = mock()
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let err = repo.list_all().await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch products");
    }

    #[tokio::test]
    async fn test_update_empty_changes_touches_nothing() {
        // No results queued: any query would fail.
        let repo = PgProductRepository::new(mock().into_connection());

        let outcome = repo
            .update(ProductId::new(1), ProductChanges::default(), now())
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::NothingToUpdate);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let db = mock()
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let changes = ProductChanges {
            stock: Some(5),
            ..Default::default()
        };
        let outcome = repo.update(ProductId::new(9), changes, now()).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_update_returns_stored_row() {
        let t = now();
        let later = t + TimeDelta::seconds(1);
        let stored = entity::Model {
            stock: 50,
            updated_at: later.into(),
            ..model(1, t)
        };
        let db = mock()
            .append_query_results([vec![model(1, t)], vec![stored]])
            .into_connection();
        let repo = PgProductRepository::new(db);

        let changes = ProductChanges {
            stock: Some(50),
            ..Default::default()
        };
        let UpdateOutcome::Updated(product) =
            repo.update(ProductId::new(1), changes, later).await.unwrap()
        else {
            panic!("expected an update");
        };

        assert_eq!(product.stock, 50);
        assert_eq!(product.name, "Widget");
        assert_eq!(product.created_at, t);
        assert_eq!(product.updated_at, later);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_a_row_was_removed() {
        let db = mock()
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();
        let repo = PgProductRepository::new(db);

        assert!(repo.delete(ProductId::new(1)).await.unwrap());
        assert!(!repo.delete(ProductId::new(1)).await.unwrap());
    }
}
