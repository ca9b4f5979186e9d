//! Schema migration registry and executor.
//!
//! # Responsibility
//! - Register schema steps in strictly increasing version order.
//! - Apply every pending step inside one transaction.
//!
//! # Invariants
//! - `version` values are monotonic.
//! - The applied version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Applies all pending schema steps on the provided connection.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is ahead of this binary.
/// - `Sqlite` when any step fails; the transaction is rolled back.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current = current_user_version(conn)?;
    let latest = latest_version();

    if current > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > current) {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={current} to_version={latest}");
    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
