//! Bounded SQLite connection pool.
//!
//! # Responsibility
//! - Hand out one exclusive connection per logical operation.
//! - Bootstrap the store schema once, on first acquisition.
//! - Keep released connections idle for reuse.
//!
//! # Invariants
//! - At most `max_size` connections are handed out at any time.
//! - A `PooledConnection` returns its connection on drop, on every exit path.
//! - Connections left inside an open transaction are discarded, not reused.
//! - A memory store keeps one anchor connection so its data outlives idle gaps.

use super::open::{bootstrap_schema, open_configured, OpenTarget};
use super::{DbError, DbResult};
use crate::config::{DatabaseLocation, RegistryConfig};
use log::{debug, warn};
use rusqlite::Connection;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    /// Connections opened and waiting for reuse.
    pub idle: usize,
    /// Connections currently handed out.
    pub in_use: usize,
    /// Upper bound on `in_use`.
    pub max_size: usize,
}

/// Shared-handle connection pool; clones refer to the same pool.
#[derive(Clone)]
pub struct ConnectionPool {
    shared: Arc<PoolShared>,
}

struct PoolShared {
    target: OpenTarget,
    busy_timeout: Duration,
    max_size: usize,
    state: Mutex<PoolState>,
}

#[derive(Default)]
struct PoolState {
    idle: Vec<Connection>,
    in_use: usize,
    bootstrapped: bool,
    anchor: Option<Connection>,
}

impl ConnectionPool {
    /// Creates a pool for the configured store.
    ///
    /// No connection is opened here; connectivity problems surface on the
    /// first `acquire`.
    pub fn new(config: &RegistryConfig) -> Self {
        let target = match &config.database {
            DatabaseLocation::File(path) => OpenTarget::File(path.clone()),
            DatabaseLocation::Memory => OpenTarget::SharedMemory(format!(
                "file:registry-{}?mode=memory&cache=shared",
                Uuid::new_v4().simple()
            )),
        };

        Self {
            shared: Arc::new(PoolShared {
                target,
                busy_timeout: config.busy_timeout,
                max_size: config.pool_max_size.max(1),
                state: Mutex::new(PoolState::default()),
            }),
        }
    }

    /// Takes one connection for exclusive use.
    ///
    /// # Errors
    /// - `DbError::PoolExhausted` when `max_size` connections are handed out.
    /// - `DbError::Sqlite` / `UnsupportedSchemaVersion` when opening or
    ///   bootstrapping the store fails.
    pub fn acquire(&self) -> DbResult<PooledConnection> {
        let mut state = self.shared.lock_state();
        if state.in_use >= self.shared.max_size {
            warn!(
                "event=pool_acquire module=db status=error error_code=pool_exhausted max_size={}",
                self.shared.max_size
            );
            return Err(DbError::PoolExhausted {
                max_size: self.shared.max_size,
            });
        }

        let conn = match state.idle.pop() {
            Some(conn) => conn,
            None => self.shared.open_connection(&mut state)?,
        };
        state.in_use += 1;

        Ok(PooledConnection {
            conn: ManuallyDrop::new(conn),
            shared: Arc::clone(&self.shared),
        })
    }

    /// Returns current occupancy counters.
    pub fn status(&self) -> PoolStatus {
        let state = self.shared.lock_state();
        PoolStatus {
            idle: state.idle.len(),
            in_use: state.in_use,
            max_size: self.shared.max_size,
        }
    }
}

impl PoolShared {
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_connection(&self, state: &mut PoolState) -> DbResult<Connection> {
        let mut conn = open_configured(&self.target, self.busy_timeout)?;
        debug!(
            "event=pool_open module=db status=ok mode={} in_use={}",
            self.target.mode(),
            state.in_use
        );
        if state.bootstrapped {
            return Ok(conn);
        }

        bootstrap_schema(&mut conn, self.target.mode())?;
        state.bootstrapped = true;

        if matches!(self.target, OpenTarget::SharedMemory(_)) {
            state.anchor = Some(conn);
            return open_configured(&self.target, self.busy_timeout);
        }
        Ok(conn)
    }

    fn release(&self, conn: Connection) {
        let mut state = self.lock_state();
        state.in_use = state.in_use.saturating_sub(1);
        if conn.is_autocommit() {
            state.idle.push(conn);
        } else {
            warn!("event=pool_release module=db status=discarded reason=open_transaction");
        }
    }
}

/// Connection guard handed out by `ConnectionPool::acquire`.
pub struct PooledConnection {
    /// Moved out exactly once, in `drop`.
    conn: ManuallyDrop<Connection>,
    shared: Arc<PoolShared>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        // SAFETY: `conn` is never touched again after this point; `drop`
        // runs once per guard.
        let conn = unsafe { ManuallyDrop::take(&mut self.conn) };
        self.shared.release(conn);
    }
}

#[cfg(test)]
mod tests {
    use super::ConnectionPool;
    use crate::config::RegistryConfig;

    #[test]
    fn guard_derefs_to_a_bootstrapped_connection() {
        let pool = ConnectionPool::new(&RegistryConfig::in_memory());
        let conn = pool.acquire().unwrap();
        let streets: i64 = conn
            .query_row("SELECT COUNT(*) FROM streets;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(streets, 0);
        drop(conn);

        let status = pool.status();
        assert_eq!((status.idle, status.in_use), (1, 0));
    }

    #[test]
    fn committed_transaction_keeps_connection_reusable() {
        let pool = ConnectionPool::new(&RegistryConfig::in_memory());
        {
            let mut conn = pool.acquire().unwrap();
            let tx = conn.transaction().unwrap();
            tx.execute("INSERT INTO streets (name_street) VALUES ('Липова');", [])
                .unwrap();
            tx.commit().unwrap();
        }
        assert_eq!(pool.status().idle, 1);
    }

    #[test]
    fn connection_left_in_transaction_is_discarded() {
        let pool = ConnectionPool::new(&RegistryConfig::in_memory());
        {
            let conn = pool.acquire().unwrap();
            conn.execute_batch("BEGIN;").unwrap();
        }
        let status = pool.status();
        assert_eq!((status.idle, status.in_use), (0, 0));

        let conn = pool.acquire().unwrap();
        assert!(conn.is_autocommit());
    }
}
