//! Format adapters for import/export.
//!
//! Each format implements the [`ImportSource`] and [`ExportSink`] traits.

pub mod csv;
pub mod json;
pub mod xlsx;

use crate::{Error, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

use super::traits::{ExportSink, ImportSource};

/// Supported file formats for import/export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Excel workbook; the first worksheet holds the header row and data.
    #[default]
    Xlsx,
    /// Spreadsheet CSV with a header row.
    Csv,
    /// JSON objects keyed by column label (newline-delimited or array).
    Json,
}

impl Format {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
            Self::Json => "jsonl",
        }
    }

    /// Returns the MIME type for this format.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv",
            Self::Json => "application/x-ndjson",
        }
    }

    /// Detects format from file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the extension is not recognized.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("json" | "ndjson" | "jsonl") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            Some(ext) => Err(Error::InvalidInput(format!(
                "Unsupported file extension: .{ext}"
            ))),
            None => Err(Error::InvalidInput(
                "Cannot determine format: file has no extension".to_string(),
            )),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "json" | "ndjson" | "jsonl" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::InvalidInput(format!("Unknown format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xlsx => write!(f, "xlsx"),
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Creates an import source for the given format and reader.
///
/// # Errors
///
/// Returns an error if the source cannot read its header, or for a
/// workbook, if the workbook cannot be parsed.
pub fn create_import_source<R: BufRead + 'static>(
    reader: R,
    format: Format,
) -> Result<Box<dyn ImportSource>> {
    match format {
        Format::Xlsx => Ok(Box::new(xlsx::XlsxImportSource::new(reader)?)),
        Format::Csv => Ok(Box::new(csv::CsvImportSource::new(reader)?)),
        Format::Json => Ok(Box::new(json::JsonImportSource::new(reader))),
    }
}

/// Creates an export sink for the given format and writer.
///
/// # Errors
///
/// Returns an error if sink creation fails.
pub fn create_export_sink<W: Write + Send + 'static>(
    writer: W,
    format: Format,
) -> Result<Box<dyn ExportSink>> {
    match format {
        Format::Xlsx => Ok(Box::new(xlsx::XlsxExportSink::new(writer)?)),
        Format::Csv => Ok(Box::new(csv::CsvExportSink::new(writer)?)),
        Format::Json => Ok(Box::new(json::JsonExportSink::new(writer))),
    }
}
