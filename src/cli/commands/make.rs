use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::migration::{MigrationCreator, StubKind};

#[derive(Subcommand)]
pub enum MakeCommands {
    #[command(about = "Create a new migration stub")]
    Migration {
        #[arg(help = "snake_case description, e.g. create_tags_table")]
        name: String,

        #[arg(long, conflicts_with = "table", help = "Table the migration creates")]
        create: Option<String>,

        #[arg(long, help = "Existing table the migration alters")]
        table: Option<String>,
    },
}

pub async fn handle(cmd: MakeCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        MakeCommands::Migration { name, create, table } => {
            let directory = AppConfig::from_env()?.migrations.directory;
            let kind = match (create, table) {
                (Some(table), _) => StubKind::Create(table),
                (None, Some(table)) => StubKind::Update(table),
                (None, None) => StubKind::Blank,
            };

            let created = MigrationCreator::new(directory).create(&name, kind)?;

            output_success(
                &output_format,
                &format!("Created migration: {}", created.path.display()),
                Some(json!({
                    "migration": created.unit_name,
                    "type": created.type_name,
                    "path": created.path,
                })),
            )?;

            if matches!(output_format, OutputFormat::Text) {
                println!(
                    "  register it in src/database/migrations/mod.rs: mod m{}; .register(NAME, {})",
                    created.unit_name, created.type_name
                );
            }
            Ok(())
        }
    }
}
