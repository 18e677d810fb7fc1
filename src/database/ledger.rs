use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::migration::{LedgerEntry, LedgerError, MigrationLedger};

const UNIQUE_VIOLATION: &str = "23505";

/// Ledger kept in the `migrations` table of the target database.
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
}

impl PgLedger {
    /// Creates the `migrations` table if it does not exist yet.
    pub async fn connect(pool: PgPool) -> Result<Self, LedgerError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS migrations (
                id SERIAL PRIMARY KEY,
                migration VARCHAR(255) NOT NULL UNIQUE,
                batch INTEGER NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&pool)
        .await
        .map_err(unavailable)?;

        Ok(Self { pool })
    }
}

fn unavailable(err: sqlx::Error) -> LedgerError {
    LedgerError::StorageUnavailable(err.to_string())
}

#[async_trait]
impl MigrationLedger for PgLedger {
    async fn recorded_names(&self) -> Result<BTreeSet<String>, LedgerError> {
        let names: Vec<String> = sqlx::query_scalar("SELECT migration FROM migrations")
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(names.into_iter().collect())
    }

    async fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        sqlx::query_as::<_, LedgerEntry>(
            "SELECT migration, batch, created_at FROM migrations ORDER BY batch ASC, migration ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unavailable)
    }

    async fn entries_for_batch(&self, batch: i32) -> Result<Vec<String>, LedgerError> {
        sqlx::query_scalar("SELECT migration FROM migrations WHERE batch = $1 ORDER BY migration ASC")
            .bind(batch)
            .fetch_all(&self.pool)
            .await
            .map_err(unavailable)
    }

    async fn latest_batch_number(&self) -> Result<i32, LedgerError> {
        let latest: Option<i32> = sqlx::query_scalar("SELECT MAX(batch) FROM migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(latest.unwrap_or(0))
    }

    async fn append(&self, name: &str, batch: i32) -> Result<(), LedgerError> {
        let result = sqlx::query("INSERT INTO migrations (migration, batch) VALUES ($1, $2)")
            .bind(name)
            .bind(batch)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(LedgerError::DuplicateEntry(name.to_string()))
            }
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn remove(&self, name: &str) -> Result<(), LedgerError> {
        let result = sqlx::query("DELETE FROM migrations WHERE migration = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound(name.to_string()));
        }
        Ok(())
    }
}
