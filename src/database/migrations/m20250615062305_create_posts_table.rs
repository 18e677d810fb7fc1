use async_trait::async_trait;

use crate::migration::{Migration, SchemaBuilder, SchemaError};

pub const NAME: &str = "20250615062305_create_posts_table";

pub struct CreatePostsTable;

#[async_trait]
impl Migration for CreatePostsTable {
    async fn up(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema
            .create(
                "posts",
                "id BIGSERIAL PRIMARY KEY, \
                 title VARCHAR(255) NOT NULL, \
                 content TEXT NOT NULL, \
                 slug VARCHAR(255) NOT NULL UNIQUE, \
                 published BOOLEAN NOT NULL DEFAULT FALSE, \
                 user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
            )
            .await
    }

    async fn down(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {
        schema.drop_if_exists("posts").await
    }
}
