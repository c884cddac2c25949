//! Connection constructors for the roster database.
//!
//! # Responsibility
//! - Open file-backed or in-memory connections.
//! - Set per-connection pragmas and run pending migrations before handing
//!   the connection out.
//!
//! # Invariants
//! - Every returned connection is migrated to the latest schema.
//! - `foreign_keys` is enabled on every returned connection.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the database file at `path`, creating and migrating it as needed.
///
/// # Side effects
/// - Runs pending schema migrations.
/// - Emits `db_open` log events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with("file", || Connection::open(path))
}

/// Opens a fresh in-memory database with the full schema applied.
///
/// # Side effects
/// - Emits `db_open` log events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let (outcome, failed_stage) = match open() {
        Err(err) => (Err(DbError::from(err)), "db_open_failed"),
        Ok(mut conn) => match configure(&mut conn) {
            Ok(()) => (Ok(conn), ""),
            Err(err) => (Err(err), "db_bootstrap_failed"),
        },
    };

    let duration_ms = started_at.elapsed().as_millis();
    match &outcome {
        Ok(_) => info!("event=db_open module=db status=ok mode={mode} duration_ms={duration_ms}"),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={duration_ms} error_code={failed_stage} error={err}"
        ),
    }

    outcome
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    // foreign_keys is per-connection in SQLite and defaults to off.
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)
}
