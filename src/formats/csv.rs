use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, Trim, WriterBuilder};
use serde_json::{Map, Value};

use crate::error::{FormdeskError, Result};
use crate::mapper::{display_value, header_key, HeaderKey, PresentationRecord};

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Every field quoted, inner quotes doubled, rows separated by `\n`.
/// Columns are the keys of the first record.
pub fn render(records: &[PresentationRecord]) -> Result<Vec<u8>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(&headers)?;
    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| record.get(*h).map(display_value).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    wtr.into_inner()
        .map_err(|e| FormdeskError::Other(format!("Failed to flush CSV: {e}")))
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Recover import records from a delimited-text backup.
///
/// Headers are mapped back to stored field names; `Status` and `Vaulted`
/// become booleans and `ID`/`Date` columns are ignored. Quotes only open a
/// quoted field at the start of a field, so a stray `"` inside a value is
/// kept as text. Blank lines are skipped and short rows are padded with
/// empty values. Fewer than two records (header plus one row) means there is
/// nothing to import.
pub fn parse(content: &str) -> Result<Vec<Value>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let mut lines: Vec<StringRecord> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        lines.push(record);
    }
    let Some((header, data)) = lines.split_first() else {
        return Ok(Vec::new());
    };
    let keys: Vec<HeaderKey> = header.iter().map(header_key).collect();

    let mut rows = Vec::new();
    for line in data {
        let mut row = Map::new();
        for (i, key) in keys.iter().enumerate() {
            let value = line.get(i).unwrap_or_default();
            match key {
                HeaderKey::Skip => {}
                HeaderKey::Resolved => {
                    row.insert("resolved".to_string(), Value::Bool(value == "Resolved"));
                }
                HeaderKey::Vaulted => {
                    row.insert("vaulted".to_string(), Value::Bool(value == "Yes"));
                }
                HeaderKey::Field(name) => {
                    row.insert(name.clone(), Value::String(value.to_string()));
                }
            }
        }
        if !row.is_empty() {
            rows.push(Value::Object(row));
        }
    }
    Ok(rows)
}
