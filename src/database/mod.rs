//! Postgres backends for the schema builder, migration ledger and user store.

pub mod ledger;
pub mod manager;
pub mod migrations;
pub mod schema;
pub mod users;

pub use ledger::PgLedger;
pub use manager::{DatabaseError, DatabaseManager};
pub use schema::PgSchema;
pub use users::PgUserStore;
