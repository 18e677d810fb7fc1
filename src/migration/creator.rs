use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::error::MigrationError;
use super::schema::is_valid_table_name;
use super::unit::{is_snake_case, type_name};

/// What kind of stub to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubKind {
    /// `--create <table>`
    Create(String),
    /// `--table <table>`
    Update(String),
    Blank,
}

/// A freshly written migration stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMigration {
    pub unit_name: String,
    pub type_name: String,
    pub path: PathBuf,
}

/// Writes new migration unit source files.
pub struct MigrationCreator {
    directory: PathBuf,
}

impl MigrationCreator {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn create(&self, name: &str, kind: StubKind) -> Result<CreatedMigration, MigrationError> {
        self.create_at(name, kind, Utc::now())
    }

    pub fn create_at(&self, name: &str, kind: StubKind, at: DateTime<Utc>) -> Result<CreatedMigration, MigrationError> {
        if !is_snake_case(name) {
            return Err(MigrationError::InvalidUnitName(name.to_string()));
        }
        if let StubKind::Create(table) | StubKind::Update(table) = &kind {
            if !is_valid_table_name(table) {
                return Err(MigrationError::InvalidUnitName(format!("{} (table {})", name, table)));
            }
        }

        let unit_name = format!("{}_{}", at.format("%Y%m%d%H%M%S"), name);
        let type_name = type_name(&unit_name);
        let path = self.directory.join(format!("m{}.rs", unit_name));

        if path.exists() {
            return Err(MigrationError::AlreadyExists(path.display().to_string()));
        }

        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(&path, render_stub(&unit_name, &type_name, &kind))?;

        tracing::info!("Created migration {}", path.display());
        Ok(CreatedMigration {
            unit_name,
            type_name,
            path,
        })
    }
}

fn render_stub(unit_name: &str, type_name: &str, kind: &StubKind) -> String {
    let (up, down) = match kind {
        StubKind::Create(table) => (
            format!(
                "        schema\n            .create(\n                \"{table}\",\n                \"id BIGSERIAL PRIMARY KEY, \\\n                 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(), \\\n                 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()\",\n            )\n            .await"
            ),
            format!("        schema.drop_if_exists(\"{table}\").await"),
        ),
        StubKind::Update(table) => (
            format!("        // Add your columns here\n        schema.alter(\"{table}\", &[]).await"),
            format!("        // Drop your columns here\n        schema.alter(\"{table}\", &[]).await"),
        ),
        StubKind::Blank => (
            "        // Add your migration logic here\n        Ok(())".to_string(),
            "        // Add your rollback logic here\n        Ok(())".to_string(),
        ),
    };

    format!(
        "use async_trait::async_trait;\n\
         \n\
         use crate::migration::{{Migration, SchemaBuilder, SchemaError}};\n\
         \n\
         pub const NAME: &str = \"{unit_name}\";\n\
         \n\
         pub struct {type_name};\n\
         \n\
         #[async_trait]\n\
         impl Migration for {type_name} {{\n\
         \x20   async fn up(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {{\n\
         {up}\n\
         \x20   }}\n\
         \n\
         \x20   async fn down(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError> {{\n\
         {down}\n\
         \x20   }}\n\
         }}\n"
    )
}
