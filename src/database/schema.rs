use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::migration::{is_valid_table_name, SchemaBuilder, SchemaError};

/// Applies DDL directly against a Postgres pool.
#[derive(Clone)]
pub struct PgSchema {
    pool: PgPool,
}

impl PgSchema {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchemaBuilder for PgSchema {
    async fn execute(&self, sql: &str) -> Result<(), SchemaError> {
        debug!("DDL: {}", sql);
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn has_table(&self, table: &str) -> Result<bool, SchemaError> {
        if !is_valid_table_name(table) {
            return Err(SchemaError::InvalidTableName(table.to_string()));
        }
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = current_schema() AND table_name = $1)",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
