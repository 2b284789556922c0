//! CSV format adapter for import/export.
//!
//! Columns are located by their labels; unknown columns are ignored.
//! Exported files start with a UTF-8 byte order mark so spreadsheet tools
//! detect the encoding of the Cyrillic labels.

use crate::io::columns::{Column, headers, record_to_row};
use crate::io::traits::{ExportSink, ImportSource, ImportedRow};
use crate::models::ClientRecord;
use crate::{Error, Result};
use std::io::{BufRead, Write};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// CSV import source.
///
/// The first row must be the header row.
pub struct CsvImportSource<R: BufRead> {
    reader: csv::Reader<R>,
    /// Column for each header position; `None` for unknown headers.
    column_map: Vec<Option<Column>>,
    /// 1-indexed number of the last data row read.
    record_number: usize,
}

impl<R: BufRead> CsvImportSource<R> {
    /// Creates a new CSV import source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailed`] if the header row cannot be read.
    /// Missing columns are not an error: their cells read as empty, so rows
    /// without an account number or full name column are skipped on import.
    pub fn new(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // Allow varying number of fields
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::ParseFailed {
                record: 0,
                cause: e.to_string(),
            })?
            .clone();

        let column_map: Vec<Option<Column>> =
            headers.iter().map(Column::from_header).collect();

        Ok(Self {
            reader: csv_reader,
            column_map,
            record_number: 0,
        })
    }
}

impl<R: BufRead> ImportSource for CsvImportSource<R> {
    fn next(&mut self) -> Result<Option<ImportedRow>> {
        let mut record = csv::StringRecord::new();

        let has_record = self
            .reader
            .read_record(&mut record)
            .map_err(|e| Error::ParseFailed {
                record: self.record_number + 1,
                cause: e.to_string(),
            })?;
        if !has_record {
            return Ok(None);
        }
        self.record_number += 1;

        let mut row = ImportedRow::new();
        for (column, value) in self.column_map.iter().zip(record.iter()) {
            if let Some(column) = column {
                row.set(*column, value);
            }
        }
        Ok(Some(row))
    }
}

/// CSV export sink.
///
/// Writes the header row, then one row per record.
pub struct CsvExportSink<W: Write> {
    writer: csv::Writer<W>,
    /// Whether headers have been written.
    headers_written: bool,
}

impl<W: Write> CsvExportSink<W> {
    /// Creates a new CSV export sink.
    ///
    /// # Errors
    ///
    /// Returns an error if the byte order mark cannot be written.
    pub fn new(mut writer: W) -> Result<Self> {
        writer
            .write_all(UTF8_BOM)
            .map_err(|e| Error::OperationFailed {
                operation: "write_csv_bom".to_string(),
                cause: e.to_string(),
            })?;

        let csv_writer = csv::WriterBuilder::new()
            .has_headers(false) // We write headers manually
            .from_writer(writer);

        Ok(Self {
            writer: csv_writer,
            headers_written: false,
        })
    }

    /// Writes headers if not already written.
    fn ensure_headers(&mut self) -> Result<()> {
        if !self.headers_written {
            self.writer
                .write_record(headers())
                .map_err(|e| Error::OperationFailed {
                    operation: "write_csv_headers".to_string(),
                    cause: e.to_string(),
                })?;
            self.headers_written = true;
        }
        Ok(())
    }
}

impl<W: Write + Send> ExportSink for CsvExportSink<W> {
    fn write(&mut self, record: &ClientRecord) -> Result<()> {
        self.ensure_headers()?;

        self.writer
            .write_record(record_to_row(record))
            .map_err(|e| Error::OperationFailed {
                operation: "write_csv".to_string(),
                cause: e.to_string(),
            })?;

        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        // An empty export still gets its header row.
        self.ensure_headers()?;
        self.writer.flush().map_err(|e| Error::OperationFailed {
            operation: "flush_csv".to_string(),
            cause: e.to_string(),
        })?;
        Ok(())
    }
}
