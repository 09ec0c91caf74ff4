//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file, in-memory, or shared-cache memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before a store is first used.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and the registry collation
//!   and fold function registered.
//! - `open_db*` connections have migrations fully applied.

use super::collation::register as register_text_helpers;
use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Physical target a pooled connection is opened against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OpenTarget {
    File(PathBuf),
    /// Named shared-cache memory database, alive while one connection is open.
    SharedMemory(String),
}

impl OpenTarget {
    pub(crate) fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::SharedMemory(_) => "shared_memory",
        }
    }
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let target = OpenTarget::File(path.as_ref().to_path_buf());
    let mut conn = open_configured(&target, DEFAULT_BUSY_TIMEOUT)?;
    bootstrap_schema(&mut conn, target.mode())?;
    Ok(conn)
}

/// Opens a private in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    let mut conn = match Connection::open_in_memory() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=memory duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };
    configure_connection(&conn, DEFAULT_BUSY_TIMEOUT)?;
    bootstrap_schema(&mut conn, "memory")?;
    Ok(conn)
}

/// Opens one connection against `target` and applies connection pragmas.
///
/// Does not run migrations; the pool runs them once per store.
pub(crate) fn open_configured(target: &OpenTarget, busy_timeout: Duration) -> DbResult<Connection> {
    let started_at = Instant::now();
    let opened = match target {
        OpenTarget::File(path) => Connection::open(path),
        OpenTarget::SharedMemory(uri) => Connection::open_with_flags(
            uri,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        ),
    };

    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                target.mode(),
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    configure_connection(&conn, busy_timeout)?;
    Ok(conn)
}

/// Applies migrations on a freshly opened connection and logs the result.
pub(crate) fn bootstrap_schema(conn: &mut Connection, mode: &str) -> DbResult<()> {
    let started_at = Instant::now();
    info!("event=db_bootstrap module=db status=start mode={mode}");

    match apply_migrations(conn) {
        Ok(()) => {
            info!(
                "event=db_bootstrap module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=db_bootstrap module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn configure_connection(conn: &Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    register_text_helpers(conn)?;
    Ok(())
}
