//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - `ConnectionFactory::acquire` opens a fresh connection on every call.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use crate::config::{DbConfig, DEFAULT_BUSY_TIMEOUT};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens connections to the store selected by a `DbConfig`.
///
/// No pooling: every `acquire` returns an independent connection which is
/// closed when the caller drops it.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    config: DbConfig,
}

impl ConnectionFactory {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// Opens the configured store, creating its directory if needed.
    ///
    /// # Errors
    /// - `DbError::Io` when the data directory cannot be created.
    /// - `DbError::Open` when SQLite cannot open the file.
    /// - `DbError::Sqlite` / `UnsupportedSchemaVersion` when bootstrap fails,
    ///   e.g. the file is not a SQLite database.
    pub fn acquire(&self) -> DbResult<Connection> {
        let data_dir = self.config.data_dir();
        if !data_dir.as_os_str().is_empty() {
            std::fs::create_dir_all(data_dir).map_err(|source| {
                error!(
                    "event=db_open module=db status=error mode=file error_code=data_dir_failed error={}",
                    source
                );
                DbError::Io {
                    path: data_dir.to_path_buf(),
                    source,
                }
            })?;
        }

        let path = self.config.db_path();
        debug!(
            "event=db_acquire module=db status=start target={} path={}",
            self.config.mode.as_str(),
            path.display()
        );
        open_with(
            "file",
            || {
                Connection::open(&path).map_err(|source| DbError::Open {
                    path: path.clone(),
                    source,
                })
            },
            self.config.enforce_foreign_keys,
            self.config.busy_timeout,
        )
    }
}

/// Opens a SQLite database file and applies all pending migrations.
///
/// Foreign keys are enforced.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with(
        "file",
        || {
            Connection::open(path).map_err(|source| DbError::Open {
                path: path.to_path_buf(),
                source,
            })
        },
        true,
        DEFAULT_BUSY_TIMEOUT,
    )
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(
        "memory",
        || Connection::open_in_memory().map_err(DbError::from),
        true,
        DEFAULT_BUSY_TIMEOUT,
    )
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> DbResult<Connection>,
    enforce_foreign_keys: bool,
    busy_timeout: Duration,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    match bootstrap_connection(&mut conn, enforce_foreign_keys, busy_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} foreign_keys={} duration_ms={}",
                mode,
                enforce_foreign_keys,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(
    conn: &mut Connection,
    enforce_foreign_keys: bool,
    busy_timeout: Duration,
) -> DbResult<()> {
    let pragma = if enforce_foreign_keys {
        "PRAGMA foreign_keys = ON;"
    } else {
        "PRAGMA foreign_keys = OFF;"
    };
    conn.execute_batch(pragma)?;
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
