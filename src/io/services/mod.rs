//! Import and export service implementations.
//!
//! Orchestrates format parsing, validation, and storage operations.

pub mod export;
pub mod import;

pub use export::{
    EXPORT_FILE_PREFIX, ExportOptions, ExportProgressCallback, ExportResult, ExportService,
    default_export_file_name, export_file_name,
};
pub use import::{ImportOptions, ImportProgress, ImportResult, ImportService, ProgressCallback};
