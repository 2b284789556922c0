//! Client import service.
//!
//! Reads rows from a spreadsheet file and creates one record per valid row.
//! Rows missing the account number or full name are skipped and counted.
//! A malformed file aborts the import; rows created before the failure stay
//! in the store.

use crate::io::formats::{Format, create_import_source};
use crate::io::traits::ImportSource;
use crate::storage::ClientStore;
use crate::{Error, Result};
use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::instrument;

/// Options for client import.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// File format; `None` detects it from the file extension.
    pub format: Option<Format>,
    /// Dry run mode (validate without storing).
    pub dry_run: bool,
}

impl ImportOptions {
    /// Sets the file format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Enables or disables dry run mode.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Progress callback for import operations.
pub type ProgressCallback = Box<dyn Fn(&ImportProgress) + Send>;

/// Progress information during import.
#[derive(Debug, Clone, Default)]
pub struct ImportProgress {
    /// Rows processed so far.
    pub processed: usize,
    /// Rows imported so far.
    pub imported: usize,
    /// Rows skipped for missing required fields.
    pub skipped_invalid: usize,
    /// Estimated total rows (if known).
    pub total_estimate: Option<usize>,
}

impl ImportProgress {
    /// Returns the percentage complete (0-100) if total is known.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent_complete(&self) -> Option<f32> {
        self.total_estimate.map(|total| {
            if total == 0 {
                100.0
            } else {
                (self.processed as f32 / total as f32) * 100.0
            }
        })
    }
}

/// Result of an import operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// Rows stored (or, in a dry run, rows that would be stored).
    pub imported: usize,
    /// Rows skipped for missing required fields.
    pub skipped_invalid: usize,
    /// Total rows processed.
    pub total_processed: usize,
    /// One message per skipped row.
    pub errors: Vec<String>,
}

impl ImportResult {
    /// Returns whether any rows were imported.
    #[must_use]
    pub const fn has_imports(&self) -> bool {
        self.imported > 0
    }
}

/// Service for importing clients from spreadsheet files.
pub struct ImportService {
    store: Arc<dyn ClientStore>,
}

impl ImportService {
    /// Creates a new import service.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    /// Imports clients from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, its format cannot be
    /// determined, it is malformed, or a store write fails.
    pub fn import_from_file(
        &self,
        path: &Path,
        options: ImportOptions,
        progress: Option<ProgressCallback>,
    ) -> Result<ImportResult> {
        let format = match options.format {
            Some(format) => format,
            None => Format::from_path(path)?,
        };

        let file = std::fs::File::open(path).map_err(|e| Error::OperationFailed {
            operation: "open_import_file".to_string(),
            cause: e.to_string(),
        })?;
        let reader = std::io::BufReader::new(file);

        self.import_from_reader(reader, options.with_format(format), progress)
    }

    /// Imports clients from a reader. CSV is assumed when no format is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed or a store write fails.
    pub fn import_from_reader<R: BufRead + 'static>(
        &self,
        reader: R,
        options: ImportOptions,
        progress: Option<ProgressCallback>,
    ) -> Result<ImportResult> {
        let mut source = create_import_source(reader, options.format.unwrap_or(Format::Csv))?;
        self.import_from_source(source.as_mut(), &options, progress)
    }

    /// Imports clients from a source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseFailed`] if the source is malformed, or the
    /// store's error if a write fails. Either aborts the import.
    #[instrument(skip_all, fields(operation = "import", dry_run = options.dry_run))]
    pub fn import_from_source(
        &self,
        source: &mut dyn ImportSource,
        options: &ImportOptions,
        progress: Option<ProgressCallback>,
    ) -> Result<ImportResult> {
        let start = Instant::now();
        let mut result = ImportResult::default();
        let mut prog = ImportProgress {
            total_estimate: source.size_hint(),
            ..Default::default()
        };

        let outcome: Result<()> = (|| {
            while let Some(row) = source.next()? {
                prog.processed += 1;
                result.total_processed += 1;

                let record = row.to_record();
                if let Err(e) = record.validate() {
                    prog.skipped_invalid += 1;
                    result.skipped_invalid += 1;
                    result
                        .errors
                        .push(format!("Record {}: {e}", result.total_processed));
                } else {
                    if !options.dry_run {
                        self.store.create(&record)?;
                    }
                    prog.imported += 1;
                    result.imported += 1;
                }

                if let Some(ref cb) = progress {
                    cb(&prog);
                }
            }
            Ok(())
        })();

        let status = if outcome.is_ok() { "success" } else { "error" };
        metrics::counter!("import_rows_total", "status" => status)
            .increment(result.imported as u64);
        metrics::histogram!("import_duration_ms").record(start.elapsed().as_secs_f64() * 1000.0);

        match outcome {
            Ok(()) => {
                tracing::info!(
                    imported = result.imported,
                    skipped_invalid = result.skipped_invalid,
                    total_processed = result.total_processed,
                    "import completed"
                );
                Ok(result)
            },
            Err(e) => {
                tracing::warn!(
                    imported = result.imported,
                    error = %e,
                    "import aborted; rows already stored are kept"
                );
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::traits::ExportSink;
    use crate::storage::SqliteClientStore;
    use std::io::Cursor;
    use std::sync::Mutex;

    fn service() -> (ImportService, Arc<dyn ClientStore>) {
        let store: Arc<dyn ClientStore> = Arc::new(SqliteClientStore::in_memory().unwrap());
        (ImportService::new(Arc::clone(&store)), store)
    }

    const MIXED: &str = "ПІБ,Особовий рахунок,Населений пункт\n\
                         Іванов,001,Київ\n\
                         Петренко,002,Львів\n\
                         ,003,Київ\n\
                         Сидоренко,004,\n";

    #[test]
    fn test_import_skips_invalid_rows() {
        let (service, store) = service();
        let result = service
            .import_from_reader(Cursor::new(MIXED), ImportOptions::default(), None)
            .unwrap();

        assert_eq!(result.imported, 3);
        assert_eq!(result.skipped_invalid, 1);
        assert_eq!(result.total_processed, 4);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Record 3"));
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_missing_name_column_skips_every_row() {
        let (service, store) = service();
        let input = "Особовий рахунок,Населений пункт\n001,Київ\n002,Львів\n";
        let result = service
            .import_from_reader(Cursor::new(input), ImportOptions::default(), None)
            .unwrap();

        assert_eq!(result.imported, 0);
        assert_eq!(result.skipped_invalid, 2);
        assert_eq!(result.total_processed, 2);
        assert!(!result.has_imports());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (service, store) = service();
        let result = service
            .import_from_reader(
                Cursor::new(MIXED),
                ImportOptions::default().with_dry_run(true),
                None,
            )
            .unwrap();

        assert_eq!(result.imported, 3);
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_parse_failure_keeps_earlier_rows() {
        let (service, store) = service();
        let input = "{\"ПІБ\": \"Іванов\", \"Особовий рахунок\": \"1\"}\nnot json\n";
        let result = service.import_from_reader(
            Cursor::new(input),
            ImportOptions::default().with_format(Format::Json),
            None,
        );

        assert!(matches!(result, Err(Error::ParseFailed { record: 2, .. })));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_progress_callback() {
        let (service, _store) = service();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        service
            .import_from_reader(
                Cursor::new(MIXED),
                ImportOptions::default(),
                Some(Box::new(move |p: &ImportProgress| {
                    sink.lock().unwrap().push(p.processed);
                })),
            )
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_import_progress_percent() {
        let progress = ImportProgress {
            processed: 50,
            total_estimate: Some(100),
            ..Default::default()
        };
        assert_eq!(progress.percent_complete(), Some(50.0));
        assert!(ImportProgress::default().percent_complete().is_none());
    }

    #[test]
    fn test_import_workbook_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clients.xlsx");
        let mut sink =
            crate::io::formats::xlsx::XlsxExportSink::new(std::fs::File::create(&path).unwrap())
                .unwrap();
        sink.write(&crate::models::ClientRecord::new("001", "Іванов"))
            .unwrap();
        sink.write(&crate::models::ClientRecord::default()).unwrap();
        Box::new(sink).finalize().unwrap();

        let (service, store) = service();
        let result = service
            .import_from_file(&path, ImportOptions::default(), None)
            .unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(result.skipped_invalid, 1);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_import_from_file_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clients.jsonl");
        std::fs::write(&path, "{\"ПІБ\": \"Іванов\", \"Особовий рахунок\": \"1\"}\n").unwrap();

        let (service, store) = service();
        let result = service
            .import_from_file(&path, ImportOptions::default(), None)
            .unwrap();
        assert_eq!(result.imported, 1);
        assert_eq!(store.count().unwrap(), 1);
    }
}
