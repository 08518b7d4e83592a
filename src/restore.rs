use std::path::Path;

use crate::batch::{import_batch, BatchImportResult};
use crate::error::{FormdeskError, Result};
use crate::formats::{csv, json, Format};
use crate::store::SubmissionStore;
use crate::tables::{detect_in_filename, Table};

const UNSUPPORTED: &str = "Only JSON and CSV files are supported";
const UNKNOWN_TABLE: &str = "Could not determine table from filename. \
    Filename should contain table name (e.g., contact_submissions.json)";

/// Restore one backup file. Problems with the file itself (wrong type,
/// unparsable content, unknown table) come back as a result carrying the
/// message rather than as an error, so the next file can still be tried.
pub fn import_file(
    store: &dyn SubmissionStore,
    path: &Path,
    table: Option<Table>,
) -> Result<BatchImportResult> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let Some(format) = Format::for_import(&file_name) else {
        return Ok(BatchImportResult::rejected(&file_name, 0, UNSUPPORTED.to_string()));
    };

    let content = std::fs::read_to_string(path)?;
    let parsed = match format {
        Format::Csv => csv::parse(&content),
        _ => json::parse(&content),
    };
    let records = match parsed {
        Ok(records) => records,
        Err(e) => {
            return Ok(BatchImportResult::rejected(
                &file_name,
                0,
                format!("Failed to parse file: {e}"),
            ))
        }
    };

    let table = match table {
        Some(t) => t,
        None => match detect_in_filename(&file_name) {
            Ok(Some(t)) => t,
            Ok(None) => {
                return Ok(BatchImportResult::rejected(
                    &file_name,
                    records.len(),
                    UNKNOWN_TABLE.to_string(),
                ))
            }
            Err(e) => {
                return Ok(BatchImportResult::rejected(&file_name, records.len(), e.to_string()))
            }
        },
    };

    let label = format!("{} ({file_name})", table.key());
    if records.is_empty() {
        return Ok(BatchImportResult {
            table: label,
            success: 0,
            failed: 0,
            errors: Vec::new(),
        });
    }

    tracing::info!(file = %file_name, table = %table, rows = records.len(), "importing file");
    let mut result = import_batch(store, table.key(), &records)?;
    result.table = label;
    Ok(result)
}

/// Restore several files in order; a file that cannot be read is reported in
/// its own result.
pub fn import_files(
    store: &dyn SubmissionStore,
    paths: &[impl AsRef<Path>],
    table: Option<Table>,
) -> Vec<BatchImportResult> {
    paths
        .iter()
        .map(|p| {
            let path = p.as_ref();
            import_file(store, path, table).unwrap_or_else(|e: FormdeskError| {
                tracing::warn!(file = %path.display(), error = %e, "import failed");
                BatchImportResult::rejected(&path.display().to_string(), 0, e.to_string())
            })
        })
        .collect()
}
