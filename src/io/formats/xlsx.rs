//! Excel workbook adapter for import/export.
//!
//! Import reads the first worksheet: its first row holds the column labels
//! and every following non-blank row is one client. Export writes a single
//! worksheet with the header row followed by one row per record, all cells
//! as text.

use crate::io::columns::{Column, headers, record_to_row};
use crate::io::traits::{ExportSink, ImportSource, ImportedRow};
use crate::models::ClientRecord;
use crate::{Error, Result};
use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use std::io::{Cursor, Read, Write};

/// Worksheet name used for exports.
pub const EXPORT_SHEET_NAME: &str = "Клієнти";

/// Width, in characters, of every exported column.
const COLUMN_WIDTH: f64 = 15.0;

/// Excel workbook import source.
///
/// The whole workbook is parsed up front, so [`size_hint`](ImportSource::size_hint)
/// is exact.
pub struct XlsxImportSource {
    rows: std::vec::IntoIter<ImportedRow>,
    total: usize,
}

impl XlsxImportSource {
    /// Reads the workbook and parses its first worksheet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailed`] if the input is not a readable
    /// workbook or has no worksheet.
    pub fn new<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| Error::OperationFailed {
                operation: "read_xlsx".to_string(),
                cause: e.to_string(),
            })?;

        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(|e| Error::ParseFailed {
            record: 0,
            cause: e.to_string(),
        })?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::ParseFailed {
                record: 0,
                cause: "workbook has no worksheets".to_string(),
            })?
            .map_err(|e| Error::ParseFailed {
                record: 0,
                cause: e.to_string(),
            })?;

        let mut sheet_rows = range.rows();
        let column_map: Vec<Option<Column>> = sheet_rows
            .next()
            .map(|header| {
                header
                    .iter()
                    .map(|cell| Column::from_header(&cell_text(cell)))
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<ImportedRow> = sheet_rows
            .filter(|cells| cells.iter().any(|cell| !cell_text(cell).trim().is_empty()))
            .map(|cells| {
                let mut row = ImportedRow::new();
                for (column, cell) in column_map.iter().zip(cells) {
                    if let Some(column) = column {
                        row.set(*column, cell_text(cell));
                    }
                }
                row
            })
            .collect();

        Ok(Self {
            total: rows.len(),
            rows: rows.into_iter(),
        })
    }
}

impl ImportSource for XlsxImportSource {
    fn next(&mut self) -> Result<Option<ImportedRow>> {
        Ok(self.rows.next())
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.total)
    }
}

/// Renders a cell the way the registry stores it: as text.
///
/// Whole numbers lose their fraction (`1234567890`, not `1234567890.0`),
/// native booleans become `true`/`false` and dates use `DD.MM.YYYY`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTime(dt) => dt.as_datetime().map_or_else(
            || dt.as_f64().to_string(),
            |at| at.format("%d.%m.%Y").to_string(),
        ),
        other => other.to_string(),
    }
}

fn write_failed(operation: &str, e: &XlsxError) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    }
}

/// Excel workbook export sink.
///
/// Rows are collected in memory; the workbook is encoded and written to the
/// destination on [`finalize`](ExportSink::finalize).
pub struct XlsxExportSink<W: Write> {
    writer: W,
    worksheet: Worksheet,
    next_row: u32,
}

impl<W: Write> XlsxExportSink<W> {
    /// Creates a sink writing a worksheet named [`EXPORT_SHEET_NAME`].
    ///
    /// # Errors
    ///
    /// Returns an error if the header row cannot be written.
    pub fn new(writer: W) -> Result<Self> {
        Self::with_sheet_name(writer, EXPORT_SHEET_NAME)
    }

    /// Creates a sink writing a worksheet named `sheet_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid worksheet name or the
    /// header row cannot be written.
    pub fn with_sheet_name(writer: W, sheet_name: &str) -> Result<Self> {
        let mut worksheet = Worksheet::new();
        worksheet
            .set_name(sheet_name)
            .map_err(|e| write_failed("name_xlsx_sheet", &e))?;

        let mut sink = Self {
            writer,
            worksheet,
            next_row: 0,
        };
        sink.write_row(&headers())?;
        for col in 0..Column::ALL.len() {
            let col = u16::try_from(col).unwrap_or(u16::MAX);
            sink.worksheet
                .set_column_width(col, COLUMN_WIDTH)
                .map_err(|e| write_failed("size_xlsx_columns", &e))?;
        }
        Ok(sink)
    }

    fn write_row<S: AsRef<str>>(&mut self, cells: &[S]) -> Result<()> {
        for (col, value) in cells.iter().enumerate() {
            let col = u16::try_from(col).unwrap_or(u16::MAX);
            self.worksheet
                .write_string(self.next_row, col, value.as_ref())
                .map_err(|e| write_failed("write_xlsx", &e))?;
        }
        self.next_row += 1;
        Ok(())
    }
}

impl<W: Write + Send> ExportSink for XlsxExportSink<W> {
    fn write(&mut self, record: &ClientRecord) -> Result<()> {
        self.write_row(&record_to_row(record))
    }

    fn finalize(self: Box<Self>) -> Result<()> {
        let Self {
            mut writer,
            worksheet,
            ..
        } = *self;

        let mut workbook = Workbook::new();
        workbook.push_worksheet(worksheet);
        let bytes = workbook
            .save_to_buffer()
            .map_err(|e| write_failed("encode_xlsx", &e))?;

        writer
            .write_all(&bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| Error::OperationFailed {
                operation: "write_xlsx_file".to_string(),
                cause: e.to_string(),
            })
    }
}
