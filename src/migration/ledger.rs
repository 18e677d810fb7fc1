use std::collections::BTreeSet;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Migration already recorded: {0}")]
    DuplicateEntry(String),

    #[error("Migration not recorded: {0}")]
    NotFound(String),

    #[error("Ledger storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Ledger data is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::StorageUnavailable(err.to_string())
    }
}

/// One applied migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerEntry {
    pub migration: String,
    pub batch: i32,
    pub created_at: DateTime<Utc>,
}

/// Durable record of which units have run and in which batch.
///
/// A name appears at most once: present means applied, absent means pending.
#[async_trait]
pub trait MigrationLedger: Send + Sync {
    async fn recorded_names(&self) -> Result<BTreeSet<String>, LedgerError>;

    /// All entries ordered by (batch, name).
    async fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Names applied in `batch`, ordered by name.
    async fn entries_for_batch(&self, batch: i32) -> Result<Vec<String>, LedgerError>;

    /// 0 when the ledger is empty.
    async fn latest_batch_number(&self) -> Result<i32, LedgerError>;

    /// Fails with `DuplicateEntry` if `name` is already recorded.
    async fn append(&self, name: &str, batch: i32) -> Result<(), LedgerError>;

    /// Fails with `NotFound` if `name` is not recorded.
    async fn remove(&self, name: &str) -> Result<(), LedgerError>;
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct LedgerDocument {
    migrations: Vec<LedgerEntry>,
}

impl LedgerDocument {
    fn sorted(&self) -> Vec<LedgerEntry> {
        let mut entries = self.migrations.clone();
        entries.sort_by(|a, b| a.batch.cmp(&b.batch).then_with(|| a.migration.cmp(&b.migration)));
        entries
    }

    fn batch(&self, batch: i32) -> Vec<String> {
        let mut names: Vec<String> = self
            .migrations
            .iter()
            .filter(|e| e.batch == batch)
            .map(|e| e.migration.clone())
            .collect();
        names.sort();
        names
    }

    fn latest_batch(&self) -> i32 {
        self.migrations.iter().map(|e| e.batch).max().unwrap_or(0)
    }

    fn insert(&mut self, name: &str, batch: i32) -> Result<(), LedgerError> {
        if self.migrations.iter().any(|e| e.migration == name) {
            return Err(LedgerError::DuplicateEntry(name.to_string()));
        }
        self.migrations.push(LedgerEntry {
            migration: name.to_string(),
            batch,
            created_at: Utc::now(),
        });
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), LedgerError> {
        let before = self.migrations.len();
        self.migrations.retain(|e| e.migration != name);
        if self.migrations.len() == before {
            return Err(LedgerError::NotFound(name.to_string()));
        }
        Ok(())
    }
}

/// Process-local ledger for tests; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    document: Mutex<LedgerDocument>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MigrationLedger for MemoryLedger {
    async fn recorded_names(&self) -> Result<BTreeSet<String>, LedgerError> {
        let doc = self.document.lock().await;
        Ok(doc.migrations.iter().map(|e| e.migration.clone()).collect())
    }

    async fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.document.lock().await.sorted())
    }

    async fn entries_for_batch(&self, batch: i32) -> Result<Vec<String>, LedgerError> {
        Ok(self.document.lock().await.batch(batch))
    }

    async fn latest_batch_number(&self) -> Result<i32, LedgerError> {
        Ok(self.document.lock().await.latest_batch())
    }

    async fn append(&self, name: &str, batch: i32) -> Result<(), LedgerError> {
        self.document.lock().await.insert(name, batch)
    }

    async fn remove(&self, name: &str) -> Result<(), LedgerError> {
        self.document.lock().await.delete(name)
    }
}

/// JSON-file ledger for deployments without a relational engine.
///
/// Every mutation rewrites the whole document through a temp file and rename.
#[derive(Debug)]
pub struct FileLedger {
    path: PathBuf,
    document: Mutex<LedgerDocument>,
}

impl FileLedger {
    /// Load the ledger at `path`; a missing file is an empty ledger.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let document = match tokio::fs::read(&path).await {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| LedgerError::Corrupt(format!("{}: {}", path.display(), e)))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerDocument::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            document: Mutex::new(document),
        })
    }

    async fn persist(&self, document: &LedgerDocument) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| LedgerError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl MigrationLedger for FileLedger {
    async fn recorded_names(&self) -> Result<BTreeSet<String>, LedgerError> {
        let doc = self.document.lock().await;
        Ok(doc.migrations.iter().map(|e| e.migration.clone()).collect())
    }

    async fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.document.lock().await.sorted())
    }

    async fn entries_for_batch(&self, batch: i32) -> Result<Vec<String>, LedgerError> {
        Ok(self.document.lock().await.batch(batch))
    }

    async fn latest_batch_number(&self) -> Result<i32, LedgerError> {
        Ok(self.document.lock().await.latest_batch())
    }

    async fn append(&self, name: &str, batch: i32) -> Result<(), LedgerError> {
        let mut doc = self.document.lock().await;
        let mut next = doc.clone();
        next.insert(name, batch)?;
        self.persist(&next).await?;
        *doc = next;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), LedgerError> {
        let mut doc = self.document.lock().await;
        let mut next = doc.clone();
        next.delete(name)?;
        self.persist(&next).await?;
        *doc = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(ledger: &dyn MigrationLedger) {
        assert_eq!(ledger.latest_batch_number().await.unwrap(), 0);
        assert!(ledger.recorded_names().await.unwrap().is_empty());

        ledger.append("20250101000002_b", 1).await.unwrap();
        ledger.append("20250101000001_a", 1).await.unwrap();
        ledger.append("20250101000003_c", 2).await.unwrap();

        assert_eq!(ledger.latest_batch_number().await.unwrap(), 2);
        assert_eq!(
            ledger.entries_for_batch(1).await.unwrap(),
            vec!["20250101000001_a", "20250101000002_b"]
        );
        let order: Vec<String> = ledger.entries().await.unwrap().into_iter().map(|e| e.migration).collect();
        assert_eq!(order, vec!["20250101000001_a", "20250101000002_b", "20250101000003_c"]);

        assert!(matches!(
            ledger.append("20250101000001_a", 3).await,
            Err(LedgerError::DuplicateEntry(name)) if name == "20250101000001_a"
        ));

        ledger.remove("20250101000003_c").await.unwrap();
        assert_eq!(ledger.latest_batch_number().await.unwrap(), 1);
        assert!(matches!(
            ledger.remove("20250101000003_c").await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn memory_ledger_contract() {
        exercise(&MemoryLedger::new()).await;
    }

    #[tokio::test]
    async fn file_ledger_contract() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(dir.path().join("migrations.json")).await.unwrap();
        exercise(&ledger).await;
    }

    #[tokio::test]
    async fn file_ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migrations.json");

        {
            let ledger = FileLedger::open(&path).await.unwrap();
            ledger.append("20250101000001_a", 1).await.unwrap();
            ledger.append("20250101000002_b", 2).await.unwrap();
        }

        let reopened = FileLedger::open(&path).await.unwrap();
        assert_eq!(reopened.latest_batch_number().await.unwrap(), 2);
        assert!(reopened.recorded_names().await.unwrap().contains("20250101000001_a"));
    }

    #[tokio::test]
    async fn file_ledger_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("migrations.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(FileLedger::open(&path).await, Err(LedgerError::Corrupt(_))));
    }
}
