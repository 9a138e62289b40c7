//! Ordered schema steps for the slot database.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly one.
//! - After each step `PRAGMA user_version` equals that step's version.
//! - All pending steps share one transaction; a failing step leaves the
//!   file at its previous version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "kv_slots",
    sql: include_str!("0001_kv_slots.sql"),
}];

/// Highest schema version this build can create.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Reads the schema version stored in the database header.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the file is newer than this build.
/// - `DbError::Migration` naming the first step that failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let steps = pending(from);
    if steps.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in steps {
        run_step(&tx, step).map_err(|source| DbError::Migration {
            version: step.version,
            name: step.name,
            source,
        })?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok(())
}

fn pending(from: u32) -> &'static [SchemaStep] {
    let applied = (from as usize).min(SCHEMA_STEPS.len());
    &SCHEMA_STEPS[applied..]
}

fn run_step(tx: &Transaction<'_>, step: &SchemaStep) -> rusqlite::Result<()> {
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)
}

#[cfg(test)]
mod tests {
    use super::{pending, SCHEMA_STEPS};

    #[test]
    fn step_versions_are_contiguous() {
        for (offset, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, offset + 1, "step {}", step.name);
        }
    }

    #[test]
    fn pending_skips_applied_steps() {
        assert_eq!(pending(0).len(), SCHEMA_STEPS.len());
        assert!(pending(SCHEMA_STEPS.len() as u32).is_empty());
        assert!(pending(u32::MAX).is_empty());
    }
}
