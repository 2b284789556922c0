//! # Gasledger
//!
//! A local subscriber registry for gas-utility operators.
//!
//! Gasledger stores client records (identity, address, meter, appliances and
//! service status) in an embedded `SQLite` database and answers the questions a
//! registry operator asks all day: who lives on this street, which meters of
//! this brand are due for verification, who has gas disconnected.
//!
//! ## Features
//!
//! - Record store with store-assigned, never-reused ids
//! - Full-scan query engine with free-text search and multi-value filters
//! - Facet option lists with one-directional address scoping
//! - Resumable infinite-scroll browsing backed by a session snapshot cache
//! - Bulk import/export using a fixed spreadsheet column schema (XLSX, CSV,
//!   JSON lines)
//!
//! ## Example
//!
//! ```rust,ignore
//! use gasledger::{ClientRecord, ClientRegistry, SearchCriteria};
//!
//! let registry = ClientRegistry::open("./clients.db")?;
//! let id = registry.create(&ClientRecord::new("0001234567", "Іванов Іван Іванович"))?;
//! let page = registry.search_paginated(&SearchCriteria::new().with_text("Іванов"), 0, 50)?;
//! assert_eq!(page.total, 1);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod io;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::RegistryConfig;
pub use models::{
    ClientId, ClientRecord, FacetOptions, FacetSelection, Page, SearchCriteria, StatusFlags,
};
pub use services::{
    BrowseSession, ClientRegistry, FacetService, QueryService, ScrollSnapshot, ScrollStateCache,
};
pub use storage::{ClientStore, SqliteClientStore};

/// Error type for gasledger operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `StorageUnavailable` | The database file cannot be opened, or its schema is unsupported |
/// | `OperationFailed` | A query or write fails, file I/O fails |
/// | `InvalidInput` | Required fields are blank, an update has no id, CLI input is malformed |
/// | `ParseFailed` | An import file is malformed (aborts the import) |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The embedded store cannot be opened.
    ///
    /// Raised when:
    /// - The database file or its directory is not accessible
    /// - The file is not a `SQLite` database
    /// - The schema version is newer than this build understands
    #[error("storage unavailable at '{path}': {cause}")]
    StorageUnavailable {
        /// Location of the store (`:memory:` for in-memory stores).
        path: String,
        /// The underlying cause.
        cause: String,
    },

    /// An operation failed.
    ///
    /// Raised when:
    /// - `SQLite` statements fail (quota, I/O, constraint)
    /// - Filesystem I/O errors occur during import/export
    /// - Session slot files cannot be written
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// Invalid input was provided.
    ///
    /// Raised before any storage call when:
    /// - Account number or full name is blank
    /// - An update is issued for a record without an id
    /// - A CLI argument cannot be interpreted
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An import file could not be parsed.
    ///
    /// Aborts the whole import. Rows already inserted by the same run are
    /// kept.
    #[error("parse failed at record {record}: {cause}")]
    ParseFailed {
        /// 1-based record number (0 for the header).
        record: usize,
        /// The underlying cause.
        cause: String,
    },
}

/// Result type alias for gasledger operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "test".to_string(),
            cause: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'test' failed: failed");

        let err = Error::StorageUnavailable {
            path: ":memory:".to_string(),
            cause: "disk I/O error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "storage unavailable at ':memory:': disk I/O error"
        );

        let err = Error::ParseFailed {
            record: 3,
            cause: "unterminated quote".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "parse failed at record 3: unterminated quote"
        );
    }
}
