//! Versioned schema migrations for the roster database.
//!
//! # Responsibility
//! - Hold the ordered migration table compiled into this build.
//! - Bring the schema and `PRAGMA user_version` forward in one transaction.
//!
//! # Invariants
//! - Target versions increase strictly along the table.
//! - A database whose version is ahead of this build is refused, not rewritten.

use crate::db::{DbError, DbResult};
use rusqlite::{Connection, Transaction};

struct Migration {
    target_version: u32,
    batch: &'static str,
}

impl Migration {
    fn run(&self, tx: &Transaction<'_>) -> DbResult<()> {
        tx.execute_batch(self.batch)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", self.target_version))?;
        Ok(())
    }
}

const MIGRATIONS: &[Migration] = &[Migration {
    target_version: 1,
    batch: include_str!("0001_init.sql"),
}];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.target_version)
}

/// Runs every migration newer than the stored version, oldest first.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let applied = stored_version(conn)?;
    let latest = latest_version();

    if applied > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: applied,
            latest_supported: latest,
        });
    }
    if applied == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS
        .iter()
        .filter(|migration| migration.target_version > applied)
    {
        migration.run(&tx)?;
    }
    tx.commit()?;

    Ok(())
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
