//! JSON format adapter for import/export.
//!
//! Each row is an object keyed by column label, the same shape a
//! spreadsheet-to-JSON conversion produces. Import accepts newline-delimited
//! objects or a single array; export writes newline-delimited objects.

use crate::io::columns::Column;
use crate::io::traits::{ExportSink, ImportSource, ImportedRow};
use crate::models::ClientRecord;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::io::{BufRead, Write};

/// JSON import source.
///
/// Automatically detects and handles both layouts:
/// - **NDJSON/JSONL**: One JSON object per line
/// - **Array**: A JSON array of objects `[{...}, {...}]`
pub struct JsonImportSource<R: BufRead> {
    reader: R,
    /// Rows parsed ahead of time (whole array, or the first line).
    buffer: Vec<ImportedRow>,
    /// Current index into buffer.
    buffer_index: usize,
    /// Whether we've detected and started parsing.
    started: bool,
    /// Whether we're in array mode.
    array_mode: bool,
    /// Number of rows yielded or buffered so far, for error reporting.
    record_number: usize,
}

impl<R: BufRead> JsonImportSource<R> {
    /// Creates a new JSON import source.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            buffer_index: 0,
            started: false,
            array_mode: false,
            record_number: 0,
        }
    }

    fn read_failed(e: &std::io::Error) -> Error {
        Error::OperationFailed {
            operation: "read_json".to_string(),
            cause: e.to_string(),
        }
    }

    /// Reads the next non-blank line. Returns `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        loop {
            line.clear();
            let bytes_read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| Self::read_failed(&e))?;
            if bytes_read == 0 {
                return Ok(None);
            }
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
    }

    /// Peeks at the first non-blank line to detect the layout.
    fn detect_format(&mut self) -> Result<bool> {
        self.started = true;
        let Some(first_line) = self.next_line()? else {
            return Ok(false); // Empty file
        };

        if first_line.trim_start().starts_with('[') {
            self.array_mode = true;
            let mut remaining = String::new();
            self.reader
                .read_to_string(&mut remaining)
                .map_err(|e| Self::read_failed(&e))?;
            let full_content = format!("{first_line}{remaining}");

            let objects: Vec<Value> =
                serde_json::from_str(&full_content).map_err(|e| Error::ParseFailed {
                    record: 1,
                    cause: format!("failed to parse JSON array: {e}"),
                })?;

            self.buffer = objects
                .into_iter()
                .enumerate()
                .map(|(i, value)| row_from_value(value, i + 1))
                .collect::<Result<_>>()?;
        } else {
            self.record_number = 1;
            self.buffer.push(parse_line(first_line.trim(), 1)?);
        }

        Ok(true)
    }
}

impl<R: BufRead> ImportSource for JsonImportSource<R> {
    fn next(&mut self) -> Result<Option<ImportedRow>> {
        if !self.started && !self.detect_format()? {
            return Ok(None);
        }

        if self.buffer_index < self.buffer.len() {
            let row = std::mem::take(&mut self.buffer[self.buffer_index]);
            self.buffer_index += 1;
            return Ok(Some(row));
        }

        if self.array_mode {
            return Ok(None);
        }

        let Some(line) = self.next_line()? else {
            return Ok(None);
        };
        self.record_number += 1;
        parse_line(line.trim(), self.record_number).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        if self.array_mode {
            Some(self.buffer.len())
        } else {
            None
        }
    }
}

fn parse_line(line: &str, record: usize) -> Result<ImportedRow> {
    let value: Value = serde_json::from_str(line).map_err(|e| Error::ParseFailed {
        record,
        cause: format!("failed to parse JSON: {e}"),
    })?;
    row_from_value(value, record)
}

/// Converts one JSON object into a row. Strings are taken as is; numbers and
/// booleans use their JSON text, so a native `true` reads as a set flag.
fn row_from_value(value: Value, record: usize) -> Result<ImportedRow> {
    let Value::Object(object) = value else {
        return Err(Error::ParseFailed {
            record,
            cause: "expected a JSON object".to_string(),
        });
    };

    let mut row = ImportedRow::new();
    for (key, value) in object {
        let Some(column) = Column::from_header(&key) else {
            continue;
        };
        let text = match value {
            Value::String(s) => s,
            Value::Null => String::new(),
            Value::Bool(_) | Value::Number(_) => value.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(Error::ParseFailed {
                    record,
                    cause: format!("column '{key}' must be a scalar value"),
                });
            },
        };
        row.set(column, text);
    }
    Ok(row)
}

/// JSON export sink.
///
/// Writes records as newline-delimited JSON (NDJSON).
pub struct JsonExportSink<W: Write> {
    writer: W,
    /// Number of records written.
    count: usize,
}

impl<W: Write> JsonExportSink<W> {
    /// Creates a new JSON export sink.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }
}

impl<W: Write + Send> ExportSink for JsonExportSink<W> {
    fn write(&mut self, record: &ClientRecord) -> Result<()> {
        let object: Map<String, Value> = Column::ALL
            .iter()
            .map(|c| (c.header().to_string(), Value::String(c.value(record))))
            .collect();

        serde_json::to_writer(&mut self.writer, &object).map_err(|e| Error::OperationFailed {
            operation: "write_json".to_string(),
            cause: e.to_string(),
        })?;
        writeln!(self.writer).map_err(|e| Error::OperationFailed {
            operation: "write_json".to_string(),
            cause: e.to_string(),
        })?;
        self.count += 1;
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        self.writer.flush().map_err(|e| Error::OperationFailed {
            operation: "flush_json".to_string(),
            cause: e.to_string(),
        })?;
        tracing::debug!(records = self.count, "JSON export finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_import_ndjson() {
        let input = r#"{"ПІБ": "Іванов", "Особовий рахунок": 1234, "Дача": true}

{"ПІБ": "Петренко", "Особовий рахунок": "0042", "Телефон": null}
"#;
        let mut source = JsonImportSource::new(Cursor::new(input));

        let first = source.next().unwrap().unwrap().to_record();
        assert_eq!(first.full_name, "Іванов");
        assert_eq!(first.account_number, "1234");
        assert!(first.dacha);

        let second = source.next().unwrap().unwrap().to_record();
        assert_eq!(second.account_number, "0042");
        assert_eq!(second.phone, "");

        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_import_array() {
        let input = r#"[
            {"ПІБ": "Іванов", "Особовий рахунок": "1"},
            {"ПІБ": "Петренко", "Особовий рахунок": "2"}
        ]"#;
        let mut source = JsonImportSource::new(Cursor::new(input));
        assert!(source.next().unwrap().is_some());
        assert_eq!(source.size_hint(), Some(2));
        assert!(source.next().unwrap().is_some());
        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_import_bad_line_reports_record() {
        let input = "{\"ПІБ\": \"Іванов\"}\n{\"ПІБ\": \n";
        let mut source = JsonImportSource::new(Cursor::new(input));
        assert!(source.next().unwrap().is_some());
        let err = source.next().unwrap_err();
        assert!(matches!(err, Error::ParseFailed { record: 2, .. }));
    }

    #[test]
    fn test_import_rejects_non_object() {
        let mut source = JsonImportSource::new(Cursor::new("[1, 2]"));
        assert!(matches!(
            source.next(),
            Err(Error::ParseFailed { record: 1, .. })
        ));
    }

    #[test]
    fn test_import_empty() {
        let mut source = JsonImportSource::new(Cursor::new("\n\n"));
        assert!(source.next().unwrap().is_none());
    }

    #[test]
    fn test_export_ndjson() {
        let mut output = Vec::new();
        {
            let mut sink = JsonExportSink::new(&mut output);
            sink.write(&ClientRecord::new("0012", "Іванов")).unwrap();
            Box::new(sink).finalize().unwrap();
        }

        let output_str = String::from_utf8(output).unwrap();
        let value: Value = serde_json::from_str(output_str.trim()).unwrap();
        assert_eq!(value["ПІБ"], "Іванов");
        assert_eq!(value["Особовий рахунок"], "0012");
        assert_eq!(value["Дача"], "Ні");
    }
}
