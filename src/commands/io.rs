//! Import and export command handlers.

use super::FilterArgs;
use gasledger::io::formats::Format;
use gasledger::io::services::export::{ExportOptions, ExportService, default_export_file_name};
use gasledger::io::services::import::{ImportOptions, ImportProgress, ImportService};
use gasledger::io::{TEMPLATE_FILE_NAME, write_template};
use gasledger::{ClientRegistry, Error, Result};
use std::io::Write;
use std::path::PathBuf;

/// Executes the import command.
pub fn cmd_import(
    registry: &ClientRegistry,
    file: PathBuf,
    format: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let format = match format {
        Some(f) => f.parse::<Format>()?,
        None => Format::from_path(&file)?,
    };

    let options = ImportOptions::default()
        .with_format(format)
        .with_dry_run(dry_run);
    let import_service = ImportService::new(registry.store());

    let progress_callback = Box::new(|progress: &ImportProgress| {
        print!(
            "\rProcessing: {} - Imported: {}, Invalid: {}",
            progress.processed, progress.imported, progress.skipped_invalid,
        );
        let _ = std::io::stdout().flush();
    });

    let result = import_service.import_from_file(&file, options, Some(progress_callback));

    println!();
    let result = result?;
    println!();

    if dry_run {
        println!("Dry run completed (no changes made):");
    } else {
        println!("Import completed:");
    }

    println!("  Imported:          {}", result.imported);
    println!("  Skipped (invalid): {}", result.skipped_invalid);
    println!("  Total processed:   {}", result.total_processed);

    if !result.errors.is_empty() {
        println!();
        println!("Errors ({}):", result.errors.len());
        for error in result.errors.iter().take(10) {
            println!("  - {error}");
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more", result.errors.len() - 10);
        }
    }

    Ok(())
}

/// Executes the export command.
///
/// Without an output path the file is named `Абоненти_<today>.<ext>` in the
/// current directory.
pub fn cmd_export(
    registry: &ClientRegistry,
    output: Option<PathBuf>,
    format: Option<String>,
    filters: &FilterArgs,
) -> Result<()> {
    let format = match (&format, &output) {
        (Some(f), _) => f.parse::<Format>()?,
        (None, Some(path)) => Format::from_path(path)?,
        (None, None) => Format::default(),
    };
    let output = output.unwrap_or_else(|| PathBuf::from(default_export_file_name(format)));

    let criteria = filters.to_criteria();
    let mut options = ExportOptions::default().with_format(format);
    if !criteria.is_empty() {
        options = options.with_criteria(criteria);
    }

    let export_service = ExportService::new(registry.store());
    let progress_callback = Box::new(|exported: usize, total: usize| {
        print!("\rExporting: {exported}/{total}");
        let _ = std::io::stdout().flush();
    });

    let result = export_service.export_to_file(&output, options, Some(progress_callback));

    println!();
    let result = result?;
    println!();

    println!("Export completed:");
    println!("  Exported: {}", result.exported);
    println!("  Format:   {}", result.format);
    if let Some(path) = result.output_path {
        println!("  Output:   {path}");
    }

    Ok(())
}

/// Writes the import template.
pub fn cmd_template(output: Option<PathBuf>) -> Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(TEMPLATE_FILE_NAME));
    let format = Format::from_path(&path).unwrap_or_default();

    let file = std::fs::File::create(&path).map_err(|e| Error::OperationFailed {
        operation: "create_template_file".to_string(),
        cause: e.to_string(),
    })?;
    write_template(std::io::BufWriter::new(file), format)?;

    println!("Template written: {}", path.display());
    Ok(())
}
