//! Row conversion for client records.
//!
//! The `clients` table keeps the indexed lookup columns as plain columns and
//! the complete record as a JSON body, so adding a display field never needs
//! a schema change.

use crate::models::{ClientId, ClientRecord};
use crate::{Error, Result};

/// Column list shared by every `SELECT` on the `clients` table.
pub const CLIENT_COLUMNS: &str = "id, body";

/// Raw row data from the `clients` table.
#[derive(Debug)]
pub struct ClientRow {
    /// Row id.
    pub id: i64,
    /// JSON-encoded record.
    pub body: String,
}

impl ClientRow {
    /// Reads a row selected with [`CLIENT_COLUMNS`].
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            body: row.get(1)?,
        })
    }
}

/// Builds a record from a raw row.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the body is not a valid record.
pub fn build_client_from_row(row: ClientRow) -> Result<ClientRecord> {
    let mut record: ClientRecord =
        serde_json::from_str(&row.body).map_err(|e| Error::OperationFailed {
            operation: "decode_client_row".to_string(),
            cause: format!("row {}: {e}", row.id),
        })?;
    record.id = Some(ClientId::new(row.id));
    Ok(record)
}

/// Encodes a record body. The id lives in its own column and is left out.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if serialization fails.
pub fn encode_client_body(record: &ClientRecord) -> Result<String> {
    let body = ClientRecord {
        id: None,
        ..record.clone()
    };
    serde_json::to_string(&body).map_err(|e| Error::OperationFailed {
        operation: "encode_client_row".to_string(),
        cause: e.to_string(),
    })
}
