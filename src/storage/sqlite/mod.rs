//! Shared `SQLite` infrastructure for the record store.
//!
//! - [`connection`]: mutex handling, pragmas, schema version
//! - [`client_row`]: row ↔ [`ClientRecord`](crate::models::ClientRecord) conversion
//! - [`metrics`]: operation metrics

mod client_row;
mod connection;
mod metrics;

pub use client_row::{CLIENT_COLUMNS, ClientRow, build_client_from_row, encode_client_body};
pub use connection::{SCHEMA_VERSION, acquire_lock, configure_connection, ensure_schema_version};
pub use metrics::{record_operation_metrics, status_label};
