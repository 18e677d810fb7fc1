use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Schema change failed: {0}")]
    Execution(String),
}

impl From<sqlx::Error> for SchemaError {
    fn from(err: sqlx::Error) -> Self {
        SchemaError::Execution(err.to_string())
    }
}

/// Storage-engine contract that migration units apply their changes through.
#[async_trait]
pub trait SchemaBuilder: Send + Sync {
    /// Run one DDL statement.
    async fn execute(&self, sql: &str) -> Result<(), SchemaError>;

    async fn has_table(&self, table: &str) -> Result<bool, SchemaError>;

    /// `CREATE TABLE <table> (<definition>)`
    async fn create(&self, table: &str, definition: &str) -> Result<(), SchemaError> {
        let sql = format!("CREATE TABLE {} ({})", quote_table(table)?, definition);
        self.execute(&sql).await
    }

    /// `ALTER TABLE <table> <clause>, <clause>, ...`
    async fn alter(&self, table: &str, clauses: &[&str]) -> Result<(), SchemaError> {
        let sql = format!("ALTER TABLE {} {}", quote_table(table)?, clauses.join(", "));
        self.execute(&sql).await
    }

    async fn drop_if_exists(&self, table: &str) -> Result<(), SchemaError> {
        let sql = format!("DROP TABLE IF EXISTS {}", quote_table(table)?);
        self.execute(&sql).await
    }
}

/// Accepts lowercase identifiers: `[a-z_][a-z0-9_]*`, at most 63 bytes.
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Validate and quote a table identifier.
pub fn quote_table(name: &str) -> Result<String, SchemaError> {
    if !is_valid_table_name(name) {
        return Err(SchemaError::InvalidTableName(name.to_string()));
    }
    Ok(format!("\"{}\"", name))
}
