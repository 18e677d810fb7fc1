use thiserror::Error;

use super::ledger::LedgerError;
use super::schema::SchemaError;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {unit}: {source}")]
    MigrationFailed {
        unit: String,
        #[source]
        source: SchemaError,
        /// Units applied by this run before the failure; they stay applied.
        applied: Vec<String>,
    },

    #[error("Rollback failed: {unit}: {source}")]
    RollbackFailed {
        unit: String,
        #[source]
        source: SchemaError,
        /// Units reverted by this call before the failure; they stay reverted.
        reverted: Vec<String>,
    },

    #[error("Migration unit not found: {unit}")]
    UnitNotFound { unit: String, reverted: Vec<String> },

    #[error("Invalid migration name: {0} (expected <14-digit timestamp>_<snake_case_name>)")]
    InvalidUnitName(String),

    #[error("Migration registered twice: {0}")]
    DuplicateUnit(String),

    #[error("Migration file already exists: {0}")]
    AlreadyExists(String),

    #[error("Migration ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Migration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    /// Names completed before the failure, if the error carries any.
    pub fn completed(&self) -> &[String] {
        match self {
            MigrationError::MigrationFailed { applied, .. } => applied,
            MigrationError::RollbackFailed { reverted, .. } => reverted,
            MigrationError::UnitNotFound { reverted, .. } => reverted,
            _ => &[],
        }
    }
}
