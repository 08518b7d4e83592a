use serde::Serialize;
use serde_json::Value;

use crate::error::{FormdeskError, Result};
use crate::mapper::to_storage_input;
use crate::store::SubmissionStore;
use crate::tables::Table;

pub const MAX_ERRORS: usize = 10;

/// Collects failure messages up to a fixed cap. Messages past the cap are
/// counted by the caller's `failed` total but not kept.
#[derive(Debug, Default)]
pub struct ErrorLog {
    messages: Vec<String>,
}

impl ErrorLog {
    pub fn push(&mut self, message: String) {
        if self.messages.len() < MAX_ERRORS {
            self.messages.push(message);
        }
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BatchImportResult {
    pub table: String,
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl BatchImportResult {
    pub fn rejected(table: &str, failed: usize, message: String) -> Self {
        Self {
            table: table.to_string(),
            success: 0,
            failed,
            errors: vec![message],
        }
    }

    /// Failures whose messages were dropped by the error cap.
    pub fn hidden_errors(&self) -> usize {
        self.failed.saturating_sub(self.errors.len())
    }
}

/// Insert every record into `table_key`, counting successes and failures.
///
/// The table and a non-empty record list are checked up front; after that no
/// single row can stop the batch.
pub fn import_batch(
    store: &dyn SubmissionStore,
    table_key: &str,
    records: &[Value],
) -> Result<BatchImportResult> {
    let table = Table::from_key(table_key)?;
    if records.is_empty() {
        return Err(FormdeskError::Validation("No data provided".to_string()));
    }

    let mut success = 0usize;
    let mut failed = 0usize;
    let mut errors = ErrorLog::default();

    for (index, record) in records.iter().enumerate() {
        let Some(fields) = record.as_object() else {
            failed += 1;
            tracing::warn!(table = %table, row = index, "row is not an object");
            errors.push(format!(
                "Row processing error: expected an object, found {}",
                type_name(record)
            ));
            continue;
        };
        let input = to_storage_input(fields);
        match store.insert(table, &input) {
            Ok(()) => success += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(table = %table, row = index, error = %e, "row insert failed");
                errors.push(format!("Row failed: {e}"));
            }
        }
    }

    tracing::info!(table = %table, success, failed, "batch import finished");
    Ok(BatchImportResult {
        table: table.key().to_string(),
        success,
        failed,
        errors: errors.into_messages(),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
