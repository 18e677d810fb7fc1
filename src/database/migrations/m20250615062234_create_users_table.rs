use async_trait::async_trait;

use crate::migration::{Migration, SchemaBuilder, SchemaError};

pub const NAME: &str = "20250615062234_create_users_table";

pub struct CreateUsersTable;

#[async_trait]
impl Migration for CreateUsersTable {
    async fn up(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema
            .create(
                "users",
                "id BIGSERIAL PRIMARY KEY, \
                 name VARCHAR(255) NOT NULL, \
                 email VARCHAR(255) NOT NULL UNIQUE, \
                 email_verified_at TIMESTAMPTZ NULL, \
                 password VARCHAR(255) NOT NULL, \
                 remember_token VARCHAR(100) NULL, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
            )
            .await
    }

    async fn down(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema.drop_if_exists("users").await
    }
}
