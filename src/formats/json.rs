use serde_json::Value;

use crate::error::{FormdeskError, Result};
use crate::store::RawRecord;

/// Stored rows as a pretty-printed JSON array.
pub fn render(rows: &[RawRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(rows)?)
}

/// Parse a backup file. A single object is treated as a one-row backup.
pub fn parse(content: &str) -> Result<Vec<Value>> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| FormdeskError::Parse(e.to_string()))?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}
