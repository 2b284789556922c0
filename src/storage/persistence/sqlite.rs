//! `SQLite`-based record store.
//!
//! Durable storage of client records in a single `clients` table. Every
//! mutation runs in its own immediate transaction and is durable when the
//! call returns.

use crate::models::{ClientId, ClientRecord};
use crate::storage::sqlite::{
    CLIENT_COLUMNS, ClientRow, acquire_lock, build_client_from_row, configure_connection,
    encode_client_body, ensure_schema_version, record_operation_metrics, status_label,
};
use crate::storage::traits::ClientStore;
use crate::{Error, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;
use tracing::instrument;

const BACKEND: &str = "sqlite";
const IN_MEMORY: &str = ":memory:";

/// `SQLite`-based record store.
///
/// # Concurrency Model
///
/// Uses a `Mutex<Connection>` because `rusqlite::Connection` is not `Sync`.
/// Calls from one owner are serialized, which gives read-your-writes for
/// sequential callers. Read paths never mutate and may interleave freely.
///
/// # Schema
///
/// - `id INTEGER PRIMARY KEY AUTOINCREMENT`: ids are never reused
/// - lookup columns `full_name`, `account_number`, `settlement`, `phone`,
///   `meter_number`, each indexed
/// - `body`: the full record as JSON
pub struct SqliteClientStore {
    conn: Mutex<Connection>,
    /// Path to the database (None for in-memory).
    db_path: Option<PathBuf>,
}

impl SqliteClientStore {
    /// Opens (or creates) a file-backed store.
    ///
    /// Opening an existing store leaves its data and indexes untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the file cannot be opened or
    /// the schema cannot be initialized.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use gasledger::storage::SqliteClientStore;
    ///
    /// let store = SqliteClientStore::new("./clients.db")?;
    /// # Ok::<(), gasledger::Error>(())
    /// ```
    pub fn new(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        let location = db_path.display().to_string();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::StorageUnavailable {
                path: location.clone(),
                cause: e.to_string(),
            })?;
        }

        let conn = Connection::open(&db_path).map_err(|e| Error::StorageUnavailable {
            path: location.clone(),
            cause: e.to_string(),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path),
        };

        store.initialize(&location)?;
        tracing::debug!(path = %location, "opened client store");
        Ok(store)
    }

    /// Creates an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageUnavailable`] if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::StorageUnavailable {
            path: IN_MEMORY.to_string(),
            cause: e.to_string(),
        })?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path: None,
        };

        store.initialize(IN_MEMORY)?;
        Ok(store)
    }

    /// Returns the database path (None for in-memory).
    #[must_use]
    pub const fn db_path(&self) -> Option<&PathBuf> {
        self.db_path.as_ref()
    }

    /// Creates the table and indexes if they do not exist.
    fn initialize(&self, location: &str) -> Result<()> {
        let conn = acquire_lock(&self.conn);

        configure_connection(&conn);
        ensure_schema_version(&conn, location)?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                full_name TEXT NOT NULL,
                account_number TEXT NOT NULL,
                settlement TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                meter_number TEXT NOT NULL DEFAULT '',
                body TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_clients_full_name ON clients(full_name);
            CREATE INDEX IF NOT EXISTS idx_clients_account_number ON clients(account_number);
            CREATE INDEX IF NOT EXISTS idx_clients_settlement ON clients(settlement);
            CREATE INDEX IF NOT EXISTS idx_clients_phone ON clients(phone);
            CREATE INDEX IF NOT EXISTS idx_clients_meter_number ON clients(meter_number);",
        )
        .map_err(|e| Error::StorageUnavailable {
            path: location.to_string(),
            cause: e.to_string(),
        })
    }

    /// Runs `f` inside `BEGIN IMMEDIATE` … `COMMIT`, rolling back on error.
    fn write_transaction<T>(
        conn: &Connection,
        f: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| Error::OperationFailed {
                operation: "begin_transaction".to_string(),
                cause: e.to_string(),
            })?;

        let result = f(conn);

        if result.is_ok() {
            conn.execute_batch("COMMIT")
                .map_err(|e| Error::OperationFailed {
                    operation: "commit_transaction".to_string(),
                    cause: e.to_string(),
                })?;
        } else {
            let _ = conn.execute_batch("ROLLBACK");
        }

        result
    }

    /// Collects rows from a prepared query.
    fn collect_rows(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
        operation: &str,
    ) -> Result<Vec<ClientRecord>> {
        let mut stmt = conn.prepare(sql).map_err(|e| Error::OperationFailed {
            operation: format!("prepare_{operation}"),
            cause: e.to_string(),
        })?;

        let rows = stmt
            .query_map(params, ClientRow::from_row)
            .map_err(|e| Error::OperationFailed {
                operation: operation.to_string(),
                cause: e.to_string(),
            })?;

        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(|e| Error::OperationFailed {
                operation: format!("{operation}_row"),
                cause: e.to_string(),
            })?;
            records.push(build_client_from_row(row)?);
        }
        Ok(records)
    }
}

/// Converts a count or offset to the `i64` `SQLite` expects.
fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl ClientStore for SqliteClientStore {
    #[instrument(skip(self, record), fields(operation = "create", backend = BACKEND))]
    fn create(&self, record: &ClientRecord) -> Result<ClientId> {
        record.validate()?;

        let start = Instant::now();
        let result = (|| {
            let body = encode_client_body(record)?;
            let conn = acquire_lock(&self.conn);

            Self::write_transaction(&conn, |conn| {
                conn.execute(
                    "INSERT INTO clients (full_name, account_number, settlement, phone, meter_number, body)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        record.full_name,
                        record.account_number,
                        record.settlement,
                        record.phone,
                        record.meter_number,
                        body
                    ],
                )
                .map_err(|e| Error::OperationFailed {
                    operation: "insert_client".to_string(),
                    cause: e.to_string(),
                })?;

                Ok(ClientId::new(conn.last_insert_rowid()))
            })
        })();

        record_operation_metrics(BACKEND, "create", start, status_label(&result));
        if let Ok(id) = &result {
            tracing::debug!(client.id = %id, "created client");
        }
        result
    }

    #[instrument(skip(self, record), fields(operation = "update", backend = BACKEND, client.id = ?record.id))]
    fn update(&self, record: &ClientRecord) -> Result<ClientId> {
        let id = record
            .id
            .ok_or_else(|| Error::InvalidInput("update requires a record id".to_string()))?;
        record.validate()?;

        let start = Instant::now();
        let result = (|| {
            let body = encode_client_body(record)?;
            let conn = acquire_lock(&self.conn);

            Self::write_transaction(&conn, |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO clients (id, full_name, account_number, settlement, phone, meter_number, body)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        id.get(),
                        record.full_name,
                        record.account_number,
                        record.settlement,
                        record.phone,
                        record.meter_number,
                        body
                    ],
                )
                .map_err(|e| Error::OperationFailed {
                    operation: "update_client".to_string(),
                    cause: e.to_string(),
                })?;

                Ok(id)
            })
        })();

        record_operation_metrics(BACKEND, "update", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "delete", backend = BACKEND, client.id = %id))]
    fn delete(&self, id: ClientId) -> Result<bool> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            Self::write_transaction(&conn, |conn| {
                let deleted = conn
                    .execute("DELETE FROM clients WHERE id = ?1", params![id.get()])
                    .map_err(|e| Error::OperationFailed {
                        operation: "delete_client".to_string(),
                        cause: e.to_string(),
                    })?;
                Ok(deleted > 0)
            })
        })();

        record_operation_metrics(BACKEND, "delete", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "get", backend = BACKEND, client.id = %id))]
    fn get(&self, id: ClientId) -> Result<Option<ClientRecord>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let row = conn
                .query_row(
                    &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
                    params![id.get()],
                    ClientRow::from_row,
                )
                .optional()
                .map_err(|e| Error::OperationFailed {
                    operation: "get_client".to_string(),
                    cause: e.to_string(),
                })?;

            row.map(build_client_from_row).transpose()
        })();

        record_operation_metrics(BACKEND, "get", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "get_all", backend = BACKEND))]
    fn get_all(&self) -> Result<Vec<ClientRecord>> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            Self::collect_rows(
                &conn,
                &format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY id"),
                [],
                "get_all",
            )
        })();

        record_operation_metrics(BACKEND, "get_all", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "get_page", backend = BACKEND))]
    fn get_page(&self, page_index: usize, page_size: usize) -> Result<Vec<ClientRecord>> {
        if page_size == 0 {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);
            let offset = page_index.saturating_mul(page_size);
            Self::collect_rows(
                &conn,
                &format!("SELECT {CLIENT_COLUMNS} FROM clients ORDER BY id LIMIT ?1 OFFSET ?2"),
                params![to_sql_int(page_size), to_sql_int(offset)],
                "get_page",
            )
        })();

        record_operation_metrics(BACKEND, "get_page", start, status_label(&result));
        result
    }

    #[instrument(skip(self), fields(operation = "count", backend = BACKEND))]
    fn count(&self) -> Result<usize> {
        let start = Instant::now();
        let result = (|| {
            let conn = acquire_lock(&self.conn);

            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))
                .map_err(|e| Error::OperationFailed {
                    operation: "count_clients".to_string(),
                    cause: e.to_string(),
                })?;

            Ok(usize::try_from(count).unwrap_or(0))
        })();

        record_operation_metrics(BACKEND, "count", start, status_label(&result));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(account: &str, name: &str) -> ClientRecord {
        ClientRecord::new(account, name)
            .with_settlement("Київ")
            .with_street("вул.", "Хрещатик")
    }

    #[test]
    fn test_create_and_get() {
        let store = SqliteClientStore::in_memory().unwrap();

        let record = client("0001234567", "Іванов Іван Іванович");
        let id = store.create(&record).unwrap();

        let retrieved = store.get(id).unwrap().unwrap();
        assert_eq!(retrieved.id, Some(id));
        assert_eq!(retrieved, record.with_id(id));
    }

    #[test]
    fn test_get_nonexistent() {
        let store = SqliteClientStore::in_memory().unwrap();
        assert!(store.get(ClientId::new(404)).unwrap().is_none());
    }

    #[test]
    fn test_create_ignores_input_id() {
        let store = SqliteClientStore::in_memory().unwrap();
        let first = store.create(&client("1", "A")).unwrap();
        let second = store
            .create(&client("2", "B").with_id(ClientId::new(1000)))
            .unwrap();
        assert!(second > first);
        assert_ne!(second, ClientId::new(1000));
    }

    #[test]
    fn test_create_rejects_blank_required_fields() {
        let store = SqliteClientStore::in_memory().unwrap();

        let result = store.create(&ClientRecord::new("", "Петренко"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = store.create(&ClientRecord::new("0001", " "));
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_update_overwrites_whole_record() {
        let store = SqliteClientStore::in_memory().unwrap();

        let mut record = client("1", "A");
        record.phone = "+380501234567".to_string();
        let id = store.create(&record).unwrap();

        let replacement = ClientRecord::new("1", "A renamed").with_id(id);
        store.update(&replacement).unwrap();

        let retrieved = store.get(id).unwrap().unwrap();
        assert_eq!(retrieved.full_name, "A renamed");
        assert_eq!(retrieved.phone, "", "update replaces, it does not merge");
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_update_without_id() {
        let store = SqliteClientStore::in_memory().unwrap();
        let result = store.update(&client("1", "A"));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_update_missing_id_upserts() {
        let store = SqliteClientStore::in_memory().unwrap();

        let id = store
            .update(&client("7", "Upserted").with_id(ClientId::new(50)))
            .unwrap();
        assert_eq!(id, ClientId::new(50));
        assert_eq!(store.count().unwrap(), 1);

        // The key generator moves past explicitly written ids.
        let next = store.create(&client("8", "Next")).unwrap();
        assert!(next > ClientId::new(50));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = SqliteClientStore::in_memory().unwrap();
        let id = store.create(&client("1", "A")).unwrap();

        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn test_ids_never_reused() {
        let store = SqliteClientStore::in_memory().unwrap();
        let first = store.create(&client("1", "A")).unwrap();
        let second = store.create(&client("2", "B")).unwrap();
        store.delete(second).unwrap();

        let third = store.create(&client("3", "C")).unwrap();
        assert!(third > second);
        assert!(second > first);
    }

    #[test]
    fn test_get_all_ascending() {
        let store = SqliteClientStore::in_memory().unwrap();
        for i in 0..5 {
            store.create(&client(&i.to_string(), "Name")).unwrap();
        }

        let all = store.get_all().unwrap();
        let ids: Vec<_> = all.iter().filter_map(|r| r.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_get_page() {
        let store = SqliteClientStore::in_memory().unwrap();
        for i in 0..7 {
            store.create(&client(&format!("{i:03}"), "Name")).unwrap();
        }

        let page = store.get_page(1, 3).unwrap();
        let accounts: Vec<_> = page.iter().map(|r| r.account_number.as_str()).collect();
        assert_eq!(accounts, vec!["003", "004", "005"]);

        assert_eq!(store.get_page(2, 3).unwrap().len(), 1);
        assert!(store.get_page(3, 3).unwrap().is_empty());
        assert!(store.get_page(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_count() {
        let store = SqliteClientStore::in_memory().unwrap();
        assert_eq!(store.count().unwrap(), 0);

        let id = store.create(&client("1", "A")).unwrap();
        store.create(&client("2", "B")).unwrap();
        assert_eq!(store.count().unwrap(), 2);

        store.delete(id).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.count().unwrap(), store.get_all().unwrap().len());
    }

    #[test]
    fn test_special_characters_roundtrip() {
        let store = SqliteClientStore::in_memory().unwrap();
        let mut record = client("1", r#"О'Коннор "Патрік"; DROP TABLE clients; --"#);
        record.phone = "+380501112233, +380671112233".to_string();

        let id = store.create(&record).unwrap();
        let retrieved = store.get(id).unwrap().unwrap();
        assert_eq!(retrieved.full_name, record.full_name);
        assert_eq!(retrieved.phone, record.phone);
    }

    #[test]
    fn test_db_path() {
        let store = SqliteClientStore::in_memory().unwrap();
        assert!(store.db_path().is_none());
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clients.db");

        let first_id = {
            let store = SqliteClientStore::new(&path).unwrap();
            store.create(&client("1", "A")).unwrap()
        };

        let store = SqliteClientStore::new(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.db_path(), Some(&path));

        let second_id = store.create(&client("2", "B")).unwrap();
        assert!(second_id > first_id);
    }
}
