use async_trait::async_trait;

use crate::migration::{Migration, SchemaBuilder, SchemaError};

pub const NAME: &str = "20250615063657_create_axion_settings_table";

pub struct CreateAxionSettingsTable;

#[async_trait]
impl Migration for CreateAxionSettingsTable {
    async fn up(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        // type is one of: string, json, boolean, integer
        schema
            .create(
                "axion_settings",
                "id BIGSERIAL PRIMARY KEY, \
                 key VARCHAR(255) NOT NULL UNIQUE, \
                 value TEXT NULL, \
                 type VARCHAR(255) NOT NULL DEFAULT 'string', \
                 description TEXT NULL, \
                 is_public BOOLEAN NOT NULL DEFAULT FALSE, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
            )
            .await
    }

    async fn down(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema.drop_if_exists("axion_settings").await
    }
}
