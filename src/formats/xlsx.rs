use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::Value;

use crate::error::{FormdeskError, Result};
use crate::mapper::{display_value, PresentationRecord};

const MAX_SHEET_NAME: usize = 31;

fn xlsx_err(e: XlsxError) -> FormdeskError {
    FormdeskError::Xlsx(e.to_string())
}

/// Excel rejects `[]:*?/\` in sheet names, leading or trailing apostrophes,
/// and names longer than 31 characters.
pub fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim_matches('\'').trim();
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Single-sheet workbook: header row from the first record's keys, then one
/// row per record with raw cell values.
pub fn render(records: &[PresentationRecord], title: &str) -> Result<Vec<u8>> {
    let Some(first) = records.first() else {
        return Ok(Vec::new());
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name(title)).map_err(xlsx_err)?;

    for (col, header) in headers.iter().enumerate() {
        let col = u16::try_from(col)
            .map_err(|_| FormdeskError::Xlsx("too many columns for a worksheet".to_string()))?;
        sheet.write_string(0, col, header.as_str()).map_err(xlsx_err)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = u32::try_from(i + 1)
            .map_err(|_| FormdeskError::Xlsx("too many rows for a worksheet".to_string()))?;
        for (col, header) in headers.iter().enumerate() {
            let col = col as u16;
            match record.get(*header) {
                None | Some(Value::Null) => {}
                Some(Value::Number(n)) => {
                    sheet
                        .write_number(row, col, n.as_f64().unwrap_or(0.0))
                        .map_err(xlsx_err)?;
                }
                Some(Value::Bool(b)) => {
                    sheet.write_boolean(row, col, *b).map_err(xlsx_err)?;
                }
                Some(other) => {
                    sheet
                        .write_string(row, col, display_value(other))
                        .map_err(xlsx_err)?;
                }
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}
