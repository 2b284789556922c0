//! Core traits for import/export operations.
//!
//! Defines the [`ImportSource`] and [`ExportSink`] traits that format adapters
//! implement to support different file formats.

use super::columns::Column;
use crate::Result;
use crate::models::ClientRecord;
use std::collections::HashMap;

/// One imported row, keyed by column.
///
/// Columns absent from the source file are simply missing here and become
/// empty fields on the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedRow {
    cells: HashMap<Column, String>,
}

impl ImportedRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cell.
    #[must_use]
    pub fn with_cell(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a cell, replacing any previous value.
    pub fn set(&mut self, column: Column, value: impl Into<String>) {
        self.cells.insert(column, value.into());
    }

    /// Returns a cell's raw value.
    #[must_use]
    pub fn get(&self, column: Column) -> Option<&str> {
        self.cells.get(&column).map(String::as_str)
    }

    /// Builds the record this row describes. Values are trimmed.
    #[must_use]
    pub fn to_record(&self) -> ClientRecord {
        let mut record = ClientRecord::default();
        for (column, value) in &self.cells {
            column.assign(&mut record, value);
        }
        record
    }
}

/// Source of imported rows.
///
/// Implementations read rows from a specific format and yield them one at a
/// time.
pub trait ImportSource {
    /// Reads the next row from the source.
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ParseFailed`] if the file is malformed.
    fn next(&mut self) -> Result<Option<ImportedRow>>;

    /// Returns an estimate of the total number of rows.
    ///
    /// Used for progress reporting. Returns `None` if unknown.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// Sink for exported records.
///
/// # Lifecycle
///
/// 1. Create sink with output destination
/// 2. Call `write()` for each record
/// 3. Call `finalize()` to complete the export
pub trait ExportSink {
    /// Writes a single record to the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or I/O fails.
    fn write(&mut self, record: &ClientRecord) -> Result<()>;

    /// Finalizes the export, flushing buffers.
    ///
    /// This method consumes the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if I/O fails.
    fn finalize(self: Box<Self>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_record() {
        let row = ImportedRow::new()
            .with_cell(Column::FullName, " Петренко Петро ")
            .with_cell(Column::AccountNumber, "0042")
            .with_cell(Column::Dacha, "true");

        let record = row.to_record();
        assert_eq!(record.full_name, "Петренко Петро");
        assert_eq!(record.account_number, "0042");
        assert!(record.dacha);
        assert_eq!(record.settlement, "");
        assert!(record.id.is_none());
    }
}
