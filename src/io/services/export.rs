//! Client export service.
//!
//! Writes stored records in id order, optionally restricted to those
//! matching a [`SearchCriteria`].

use crate::io::formats::{Format, create_export_sink};
use crate::io::traits::ExportSink;
use crate::models::{ClientRecord, SearchCriteria};
use crate::services::matches;
use crate::storage::ClientStore;
use crate::{Error, Result};
use chrono::NaiveDate;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::instrument;

/// Prefix of exported file names.
pub const EXPORT_FILE_PREFIX: &str = "Абоненти";

/// Builds the export file name for `date`: `Абоненти_YYYY-MM-DD.<ext>`.
#[must_use]
pub fn export_file_name(date: NaiveDate, format: Format) -> String {
    format!(
        "{EXPORT_FILE_PREFIX}_{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Export file name for today's local date.
#[must_use]
pub fn default_export_file_name(format: Format) -> String {
    export_file_name(chrono::Local::now().date_naive(), format)
}

/// Options for client export.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// File format; `None` detects it from the file extension.
    pub format: Option<Format>,
    /// Only export records matching these criteria.
    pub criteria: Option<SearchCriteria>,
}

impl ExportOptions {
    /// Sets the file format.
    #[must_use]
    pub const fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Restricts the export to matching records.
    #[must_use]
    pub fn with_criteria(mut self, criteria: SearchCriteria) -> Self {
        self.criteria = Some(criteria);
        self
    }
}

/// Result of an export operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of records exported.
    pub exported: usize,
    /// Format used for export.
    pub format: Format,
    /// Output path (if file export).
    pub output_path: Option<String>,
}

impl ExportResult {
    /// Creates a new export result.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self {
            exported: 0,
            format,
            output_path: None,
        }
    }

    /// Returns whether any records were exported.
    #[must_use]
    pub const fn has_exports(&self) -> bool {
        self.exported > 0
    }
}

/// Progress callback for export operations: `(exported, total)`.
pub type ExportProgressCallback = Box<dyn Fn(usize, usize) + Send>;

/// Service for exporting clients to spreadsheet files.
pub struct ExportService {
    store: Arc<dyn ClientStore>,
}

impl ExportService {
    /// Creates a new export service.
    #[must_use]
    pub fn new(store: Arc<dyn ClientStore>) -> Self {
        Self { store }
    }

    /// Exports clients to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or export fails.
    pub fn export_to_file(
        &self,
        path: &Path,
        options: ExportOptions,
        progress: Option<ExportProgressCallback>,
    ) -> Result<ExportResult> {
        let format = match options.format {
            Some(format) => format,
            None => Format::from_path(path)?,
        };

        let file = std::fs::File::create(path).map_err(|e| Error::OperationFailed {
            operation: "create_export_file".to_string(),
            cause: e.to_string(),
        })?;
        let writer = std::io::BufWriter::new(file);

        let mut result = self.export_to_writer(writer, options.with_format(format), progress)?;
        result.output_path = Some(path.display().to_string());
        Ok(result)
    }

    /// Exports clients to a writer. CSV is assumed when no format is set.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn export_to_writer<W: Write + Send + 'static>(
        &self,
        writer: W,
        options: ExportOptions,
        progress: Option<ExportProgressCallback>,
    ) -> Result<ExportResult> {
        let mut sink = create_export_sink(writer, options.format.unwrap_or(Format::Csv))?;
        let result = self.export_to_sink(sink.as_mut(), &options, progress)?;
        sink.finalize()?;
        Ok(result)
    }

    /// Exports clients to a sink. The sink is not finalized.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the store or writing fails.
    #[instrument(skip_all, fields(operation = "export"))]
    pub fn export_to_sink(
        &self,
        sink: &mut dyn ExportSink,
        options: &ExportOptions,
        progress: Option<ExportProgressCallback>,
    ) -> Result<ExportResult> {
        let records: Vec<ClientRecord> = match &options.criteria {
            Some(criteria) => self
                .store
                .get_all()?
                .into_iter()
                .filter(|r| matches(r, criteria))
                .collect(),
            None => self.store.get_all()?,
        };
        let total = records.len();

        let mut result = ExportResult::new(options.format.unwrap_or(Format::Csv));
        for record in &records {
            sink.write(record)?;
            result.exported += 1;

            if let Some(ref cb) = progress {
                cb(result.exported, total);
            }
        }

        metrics::counter!("export_rows_total").increment(result.exported as u64);
        tracing::info!(exported = result.exported, "export completed");
        Ok(result)
    }
}
