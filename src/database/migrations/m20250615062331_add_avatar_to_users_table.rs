use async_trait::async_trait;

use crate::migration::{Migration, SchemaBuilder, SchemaError};

pub const NAME: &str = "20250615062331_add_avatar_to_users_table";

pub struct AddAvatarToUsersTable;

#[async_trait]
impl Migration for AddAvatarToUsersTable {
    async fn up(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema
            .alter("users", &["ADD COLUMN avatar VARCHAR(255) NULL", "ADD COLUMN bio TEXT NULL"])
            .await
    }

    async fn down(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema.alter("users", &["DROP COLUMN avatar", "DROP COLUMN bio"]).await
    }
}
