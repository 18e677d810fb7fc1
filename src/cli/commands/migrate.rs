use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_error, output_names, output_success};
use crate::cli::OutputFormat;
use crate::config::{AppConfig, LedgerBackend};
use crate::database::{migrations, DatabaseManager, PgLedger, PgSchema};
use crate::migration::{FileLedger, MigrationError, MigrationLedger, Migrator, UnitStatus};

#[derive(Subcommand)]
pub enum MigrateCommands {
    #[command(about = "Apply every pending migration as one new batch")]
    Run,

    #[command(about = "Revert the most recent batches")]
    Rollback {
        #[arg(long, default_value_t = 1, help = "Number of batches to revert")]
        step: usize,
    },

    #[command(about = "Show applied and pending migrations")]
    Status,

    #[command(about = "Revert every applied migration")]
    Reset,
}

pub async fn handle(cmd: MigrateCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the migration database")?;
    let schema = PgSchema::new(pool.clone());

    match &config.migrations.ledger {
        LedgerBackend::Database => {
            let ledger = PgLedger::connect(pool).await?;
            execute(cmd, Migrator::new(migrations::registry(), ledger, schema)?, &output_format).await
        }
        LedgerBackend::File(path) => {
            let ledger = FileLedger::open(path).await?;
            execute(cmd, Migrator::new(migrations::registry(), ledger, schema)?, &output_format).await
        }
    }
}

async fn execute<L: MigrationLedger>(
    cmd: MigrateCommands,
    migrator: Migrator<L, PgSchema>,
    output_format: &OutputFormat,
) -> anyhow::Result<()> {
    let result = match cmd {
        MigrateCommands::Run => migrator
            .run()
            .await
            .map(|names| output_names(output_format, "Migrated", &names, "Nothing to migrate.")),
        MigrateCommands::Rollback { step } => migrator
            .rollback(step)
            .await
            .map(|names| output_names(output_format, "Rolled back", &names, "Nothing to rollback.")),
        MigrateCommands::Reset => migrator
            .reset()
            .await
            .map(|names| output_names(output_format, "Rolled back", &names, "Nothing to rollback.")),
        MigrateCommands::Status => migrator
            .status()
            .await
            .map(|rows| output_status(output_format, &rows)),
    };

    match result {
        Ok(output) => output,
        Err(err) => fail(output_format, err),
    }
}

fn fail(output_format: &OutputFormat, err: MigrationError) -> anyhow::Result<()> {
    output_error(output_format, &err.to_string(), err.completed())?;
    Err(err.into())
}

fn output_status(output_format: &OutputFormat, rows: &[UnitStatus]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_success(output_format, "Migration status", Some(json!({ "migrations": rows }))),
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No migrations found.");
                return Ok(());
            }
            println!("{:<8} {:<6} {}", "Status", "Batch", "Migration");
            for row in rows {
                let batch = row.batch.map(|b| b.to_string()).unwrap_or_default();
                println!("{:<8} {:<6} {}", row.state.to_string(), batch, row.name);
            }
            Ok(())
        }
    }
}
