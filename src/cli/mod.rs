pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "axion")]
#[command(about = "Axion CLI - schema migrations and scaffolding")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply, revert and inspect schema migrations")]
    Migrate {
        #[command(subcommand)]
        cmd: commands::migrate::MigrateCommands,
    },

    #[command(about = "Generate source stubs")]
    Make {
        #[command(subcommand)]
        cmd: commands::make::MakeCommands,
    },
}

#[derive(Debug, Clone)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate { cmd } => commands::migrate::handle(cmd, output_format).await,
        Commands::Make { cmd } => commands::make::handle(cmd, output_format).await,
    }
}
