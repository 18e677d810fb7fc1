//! Versioned schema migrations: units, the ledger of what ran, and the runner.

pub mod creator;
pub mod error;
pub mod ledger;
pub mod runner;
pub mod schema;
pub mod unit;

pub use creator::{CreatedMigration, MigrationCreator, StubKind};
pub use error::MigrationError;
pub use ledger::{FileLedger, LedgerEntry, LedgerError, MemoryLedger, MigrationLedger};
pub use runner::{Migrator, UnitState, UnitStatus};
pub use schema::{is_valid_table_name, quote_table, SchemaBuilder, SchemaError};
pub use unit::{is_valid_unit_name, Migration, MigrationRegistry, MigrationUnit};
