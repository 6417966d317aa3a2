//! Versioned schema scripts for the catalog store.
//!
//! The store's schema version lives in `PRAGMA user_version`. On open, every
//! script newer than that version runs inside one transaction and the version
//! is bumped after each script, so a failed upgrade leaves the store at its
//! previous version. Each successful upgrade logs one `event=db_migrate`
//! line with the old and new versions.
//!
//! Scripts use `CREATE ... IF NOT EXISTS`, so a store whose catalog tables
//! were created by hand (version 0) is adopted without touching its rows.
//! A store stamped with a version this build does not know is refused.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, script)` pairs in ascending version order.
const SCHEMA_SCRIPTS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Newest schema version this build can produce.
pub fn latest_version() -> u32 {
    SCHEMA_SCRIPTS.last().map_or(0, |(version, _)| *version)
}

/// Brings the connected store up to `latest_version()`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the store is newer than this build.
/// - `DbError::Sqlite` when a script fails; nothing from the run is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let stored = stored_version(conn)?;
    let target = latest_version();

    match stored.cmp(&target) {
        std::cmp::Ordering::Equal => return Ok(()),
        std::cmp::Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: stored,
                latest_supported: target,
            })
        }
        std::cmp::Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    for (version, script) in SCHEMA_SCRIPTS.iter().filter(|(version, _)| *version > stored) {
        tx.execute_batch(script)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        stored, target
    );
    Ok(())
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
