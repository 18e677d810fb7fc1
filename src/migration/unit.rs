use std::sync::Arc;

use async_trait::async_trait;

use super::schema::{SchemaBuilder, SchemaError};

/// A single schema change with a forward and an inverse operation.
#[async_trait]
pub trait Migration: Send + Sync {
    async fn up(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError>;

    async fn down(&self, schema: &dyn SchemaBuilder) -> Result<(), SchemaError>;
}

/// A named, registered migration.
#[derive(Clone)]
pub struct MigrationUnit {
    name: String,
    migration: Arc<dyn Migration>,
}

impl MigrationUnit {
    pub fn new(name: impl Into<String>, migration: impl Migration + 'static) -> Self {
        Self {
            name: name.into(),
            migration: Arc::new(migration),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// PascalCase type name derived from the descriptive suffix.
    pub fn type_name(&self) -> String {
        type_name(&self.name)
    }

    pub(crate) fn migration(&self) -> &dyn Migration {
        self.migration.as_ref()
    }
}

impl std::fmt::Debug for MigrationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationUnit").field("name", &self.name).finish()
    }
}

/// Static list of units, in registration order.
#[derive(Default, Clone, Debug)]
pub struct MigrationRegistry {
    units: Vec<MigrationUnit>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: impl Into<String>, migration: impl Migration + 'static) -> Self {
        self.units.push(MigrationUnit::new(name, migration));
        self
    }

    pub fn into_units(self) -> Vec<MigrationUnit> {
        self.units
    }
}

pub const TIMESTAMP_LEN: usize = 14;

/// `<14-digit timestamp>_<snake_case name>`
pub fn is_valid_unit_name(name: &str) -> bool {
    if name.len() <= TIMESTAMP_LEN + 1 || !name.is_char_boundary(TIMESTAMP_LEN) {
        return false;
    }
    let (timestamp, rest) = name.split_at(TIMESTAMP_LEN);
    timestamp.chars().all(|c| c.is_ascii_digit())
        && rest
            .strip_prefix('_')
            .map(is_snake_case)
            .unwrap_or(false)
}

/// Lowercase words joined by single underscores, starting with a letter.
pub fn is_snake_case(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_lowercase())
        && !name.ends_with('_')
        && !name.contains("__")
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Drop the timestamp prefix and PascalCase the remainder.
pub fn type_name(unit_name: &str) -> String {
    let suffix = match unit_name.split_once('_') {
        Some((prefix, rest)) if prefix.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => unit_name,
    };
    suffix
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
