use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

use crate::models::{NewProduct, Product, ProductId};

/// Sea-ORM entity for the `products` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub stock: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub const TAG: &'static str = "products";
}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: ProductId::new(model.id),
            name: model.name,
            price: model.price,
            stock: model.stock,
            created_at: model.created_at.to_utc(),
            updated_at: model.updated_at.to_utc(),
        }
    }
}

// The id is left to the sequence.
impl From<NewProduct> for ActiveModel {
    fn from(input: NewProduct) -> Self {
        ActiveModel {
            id: NotSet,
            name: Set(input.name),
            price: Set(input.price),
            stock: Set(input.stock),
            created_at: Set(input.created_at.into()),
            updated_at: Set(input.updated_at.into()),
        }
    }
}
