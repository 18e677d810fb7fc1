use async_trait::async_trait;

use crate::migration::{Migration, SchemaBuilder, SchemaError};

pub const NAME: &str = "20250615062714_create_categories_table";

pub struct CreateCategoriesTable;

#[async_trait]
impl Migration for CreateCategoriesTable {
    async fn up(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema
            .create(
                "categories",
                "id BIGSERIAL PRIMARY KEY, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
            )
            .await
    }

    async fn down(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema.drop_if_exists("categories").await
    }
}
