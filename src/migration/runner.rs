use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use super::error::MigrationError;
use super::ledger::MigrationLedger;
use super::schema::SchemaBuilder;
use super::unit::{is_valid_unit_name, MigrationRegistry, MigrationUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnitState {
    Applied,
    Pending,
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitState::Applied => write!(f, "Applied"),
            UnitState::Pending => write!(f, "Pending"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitStatus {
    pub name: String,
    pub state: UnitState,
    pub batch: Option<i32>,
}

/// Applies and reverts registered units, grouping each run into a batch.
///
/// Execution is strictly sequential. Two processes running the same ledger
/// concurrently is not supported.
pub struct Migrator<L, S> {
    units: Vec<MigrationUnit>,
    ledger: L,
    schema: S,
}

impl<L, S> Migrator<L, S>
where
    L: MigrationLedger,
    S: SchemaBuilder,
{
    /// Validates unit names, rejects duplicates and sorts units by name.
    pub fn new(registry: MigrationRegistry, ledger: L, schema: S) -> Result<Self, MigrationError> {
        let mut units = registry.into_units();
        for unit in &units {
            if !is_valid_unit_name(unit.name()) {
                return Err(MigrationError::InvalidUnitName(unit.name().to_string()));
            }
        }
        units.sort_by(|a, b| a.name().cmp(b.name()));
        if let Some(pair) = units.windows(2).find(|pair| pair[0].name() == pair[1].name()) {
            return Err(MigrationError::DuplicateUnit(pair[0].name().to_string()));
        }

        Ok(Self { units, ledger, schema })
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    /// All registered units, ascending by name.
    pub fn discover_units(&self) -> &[MigrationUnit] {
        &self.units
    }

    /// Discovered units not yet recorded in the ledger, in discovery order.
    pub async fn pending(&self) -> Result<Vec<&MigrationUnit>, MigrationError> {
        let ran = self.ledger.recorded_names().await?;
        Ok(self.units.iter().filter(|unit| !ran.contains(unit.name())).collect())
    }

    /// Apply every pending unit under one new batch number.
    ///
    /// Stops at the first failing unit; units applied before it stay applied.
    pub async fn run(&self) -> Result<Vec<String>, MigrationError> {
        let pending = self.pending().await?;
        if pending.is_empty() {
            info!("Nothing to migrate");
            return Ok(Vec::new());
        }

        let batch = self.ledger.latest_batch_number().await? + 1;
        let mut applied = Vec::with_capacity(pending.len());

        for unit in pending {
            info!(batch, "Migrating: {}", unit.name());
            if let Err(source) = unit.migration().up(&self.schema).await {
                warn!("Migration failed: {}: {}", unit.name(), source);
                return Err(MigrationError::MigrationFailed {
                    unit: unit.name().to_string(),
                    source,
                    applied,
                });
            }
            self.ledger.append(unit.name(), batch).await?;
            info!(batch, "Migrated: {}", unit.name());
            applied.push(unit.name().to_string());
        }

        Ok(applied)
    }

    /// Revert the latest `steps` batches, newest unit first within each batch.
    pub async fn rollback(&self, steps: usize) -> Result<Vec<String>, MigrationError> {
        let mut reverted = Vec::new();

        for _ in 0..steps {
            let batch = self.ledger.latest_batch_number().await?;
            if batch == 0 {
                break;
            }
            let names = self.ledger.entries_for_batch(batch).await?;
            if names.is_empty() {
                break;
            }
            for name in names.iter().rev() {
                self.revert(name, &mut reverted).await?;
            }
        }

        if reverted.is_empty() {
            info!("Nothing to rollback");
        }
        Ok(reverted)
    }

    /// Revert every applied unit, most recently applied first.
    pub async fn reset(&self) -> Result<Vec<String>, MigrationError> {
        let entries = self.ledger.entries().await?;
        let mut reverted = Vec::with_capacity(entries.len());

        for entry in entries.iter().rev() {
            self.revert(&entry.migration, &mut reverted).await?;
        }
        Ok(reverted)
    }

    /// State of every discovered unit, in discovery order.
    pub async fn status(&self) -> Result<Vec<UnitStatus>, MigrationError> {
        let entries = self.ledger.entries().await?;
        Ok(self
            .units
            .iter()
            .map(|unit| {
                let batch = entries.iter().find(|e| e.migration == unit.name()).map(|e| e.batch);
                UnitStatus {
                    name: unit.name().to_string(),
                    state: if batch.is_some() { UnitState::Applied } else { UnitState::Pending },
                    batch,
                }
            })
            .collect())
    }

    async fn revert(&self, name: &str, reverted: &mut Vec<String>) -> Result<(), MigrationError> {
        let Some(unit) = self.units.iter().find(|unit| unit.name() == name) else {
            return Err(MigrationError::UnitNotFound {
                unit: name.to_string(),
                reverted: std::mem::take(reverted),
            });
        };

        info!("Rolling back: {}", name);
        if let Err(source) = unit.migration().down(&self.schema).await {
            warn!("Rollback failed: {}: {}", name, source);
            return Err(MigrationError::RollbackFailed {
                unit: name.to_string(),
                source,
                reverted: std::mem::take(reverted),
            });
        }
        self.ledger.remove(name).await?;
        info!("Rolled back: {}", name);
        reverted.push(name.to_string());
        Ok(())
    }
}
