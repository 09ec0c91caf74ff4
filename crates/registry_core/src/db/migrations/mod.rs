//! Registry schema history.
//!
//! # Responsibility
//! - Build the street → house → apartment → student tables, then the
//!   `vw_students_by_street` reporting view on top of them.
//! - Bring an older store forward in one transaction.
//!
//! # Invariants
//! - Steps are ordered by `version`; a step only ever adds objects.
//! - `PRAGMA user_version` records the last step applied, so a store written
//!   by a newer build is refused instead of downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step shipped with this build.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "address_tree",
        sql: include_str!("0001_address_tree.sql"),
    },
    SchemaStep {
        version: 2,
        name: "students",
        sql: include_str!("0002_students.sql"),
    },
    SchemaStep {
        version: 3,
        name: "students_by_street_view",
        sql: include_str!("0003_students_by_street_view.sql"),
    },
];

/// Schema version a fully bootstrapped registry store reports.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Runs every step newer than the store's `user_version`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the store is ahead of this build.
/// - `DbError::Sqlite` when a step fails; nothing from the batch is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let store_version = schema_version(conn)?;
    let latest = latest_version();

    if store_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: store_version,
            latest_supported: latest,
        });
    }
    if store_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > store_version)
    {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version, schema_version, SCHEMA_STEPS};
    use crate::db::DbError;
    use rusqlite::Connection;

    fn object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ?1 AND name = ?2;",
            [kind, name],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn steps_are_numbered_consecutively_from_one() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
        assert_eq!(latest_version(), 3);
    }

    #[test]
    fn fresh_store_gets_address_tree_students_and_view() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn).unwrap();

        for table in ["streets", "houses", "apartments", "students"] {
            assert!(object_exists(&conn, "table", table), "missing table {table}");
        }
        assert!(object_exists(&conn, "view", "vw_students_by_street"));
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn store_at_address_tree_only_is_brought_forward() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_STEPS[0].sql).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();
        conn.execute("INSERT INTO streets (name_street) VALUES ('Соборна');", [])
            .unwrap();

        apply_migrations(&mut conn).unwrap();
        apply_migrations(&mut conn).unwrap();

        let streets: i64 = conn
            .query_row("SELECT COUNT(*) FROM streets;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(streets, 1);
        assert!(object_exists(&conn, "table", "students"));
        assert_eq!(schema_version(&conn).unwrap(), 3);
    }

    #[test]
    fn newer_store_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", 9).unwrap();

        match apply_migrations(&mut conn) {
            Err(DbError::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            }) => {
                assert_eq!(db_version, 9);
                assert_eq!(latest_supported, 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
