//! Connection handling for the `SQLite` record store.
//!
//! Mutex acquisition with poison recovery, connection pragmas and the
//! single-version schema check.

use crate::{Error, Result};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: i32 = 1;

/// Acquires the connection mutex, recovering from poison.
///
/// A panic inside a previous critical section leaves the connection itself
/// usable; recovery keeps one failed call from taking the store down.
pub fn acquire_lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("SQLite mutex was poisoned, recovering");
            metrics::counter!("sqlite_mutex_poison_recovery_total").increment(1);
            poisoned.into_inner()
        },
    }
}

/// Applies connection pragmas.
///
/// - **WAL mode**: readers do not block the writer
/// - **NORMAL synchronous**: durable at transaction boundaries in WAL mode
/// - **`busy_timeout`**: waits up to 5 seconds on lock contention
///
/// Pragma results are ignored: `journal_mode` returns a row, and in-memory
/// databases silently keep the `memory` journal.
pub fn configure_connection(conn: &Connection) {
    let _ = conn.pragma_update(None, "journal_mode", "WAL");
    let _ = conn.pragma_update(None, "synchronous", "NORMAL");
    let _ = conn.pragma_update(None, "busy_timeout", "5000");
}

/// Checks and stamps the schema version.
///
/// A fresh database (version 0) is stamped with [`SCHEMA_VERSION`]. A
/// database written by a newer build is refused.
///
/// # Errors
///
/// Returns [`Error::StorageUnavailable`] if the version cannot be read or is
/// newer than [`SCHEMA_VERSION`].
pub fn ensure_schema_version(conn: &Connection, location: &str) -> Result<()> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| Error::StorageUnavailable {
            path: location.to_string(),
            cause: e.to_string(),
        })?;

    if version > SCHEMA_VERSION {
        return Err(Error::StorageUnavailable {
            path: location.to_string(),
            cause: format!(
                "schema version {version} is newer than supported version {SCHEMA_VERSION}"
            ),
        });
    }

    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|e| Error::StorageUnavailable {
                path: location.to_string(),
                cause: e.to_string(),
            })?;
    }

    Ok(())
}
