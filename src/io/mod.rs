//! Import/Export I/O subsystem.
//!
//! Bulk client import and export through spreadsheet files, sharing one
//! fixed column schema.
//!
//! # Architecture
//!
//! - [`columns`]: the 45 labelled columns and their record fields
//! - **Format adapters** implement [`ImportSource`] and [`ExportSink`]
//! - **Services** orchestrate format parsing, validation, and storage
//! - [`template`]: the example file for operators
//!
//! # Supported Formats
//!
//! | Format | Import | Export | Notes |
//! |--------|--------|--------|-------|
//! | XLSX | ✓ | ✓ | First worksheet; header row with column labels |
//! | CSV | ✓ | ✓ | Header row with column labels; UTF-8 BOM on export |
//! | JSON | ✓ | ✓ | Objects keyed by column label, NDJSON or array |
//!
//! # Examples
//!
//! ```rust,ignore
//! use gasledger::io::{ImportOptions, ImportService};
//!
//! let service = ImportService::new(registry.store());
//! let result = service.import_from_file(path, ImportOptions::default(), None)?;
//! println!("Imported {} clients", result.imported);
//! ```

pub mod columns;
pub mod formats;
pub mod services;
pub mod template;
pub mod traits;

// Re-exports for convenience
pub use columns::Column;
pub use formats::Format;
pub use services::export::{
    ExportOptions, ExportResult, ExportService, default_export_file_name, export_file_name,
};
pub use services::import::{ImportOptions, ImportProgress, ImportResult, ImportService};
pub use template::{TEMPLATE_FILE_NAME, TEMPLATE_SHEET_NAME, template_record, write_template};
pub use traits::{ExportSink, ImportSource, ImportedRow};
