//! SQLite store bootstrap, connection pooling and store-side procedures.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the registry core.
//! - Apply schema migrations in deterministic order.
//! - Hand out short-lived pooled connections, one per logical operation.
//! - Host the named procedures the core invokes for store-encapsulated logic.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write registry data before migrations succeed.
//! - Every acquired connection goes back to the pool when its guard drops.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod collation;
pub mod migrations;
mod open;
pub mod pool;
pub mod procedures;

pub use open::{open_db, open_db_in_memory};
pub use pool::{ConnectionPool, PoolStatus, PooledConnection};
pub use procedures::{ProcedureCall, ProcedureOutput};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Every pooled connection is already handed out.
    PoolExhausted {
        max_size: usize,
    },
    /// No procedure is registered under the requested name.
    UnknownProcedure(String),
    /// The procedure ran and signalled a failure of its own.
    ProcedureFailed {
        procedure: &'static str,
        message: String,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::PoolExhausted { max_size } => write!(
                f,
                "connection pool exhausted: all {max_size} connections are in use"
            ),
            Self::UnknownProcedure(name) => write!(f, "unknown store procedure `{name}`"),
            Self::ProcedureFailed { procedure, message } => write!(f, "{procedure}: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::PoolExhausted { .. } => None,
            Self::UnknownProcedure(_) => None,
            Self::ProcedureFailed { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
