use std::io::{Cursor, Write};

use chrono::NaiveDate;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::formats::encode_table;
use crate::store::{Filter, SubmissionStore};
use crate::tables::{Table, ALL_TABLES};

pub struct TableSummary {
    pub table: Table,
    pub rows: usize,
    pub files: Vec<String>,
}

pub struct Archive {
    /// Download name, e.g. `graycup-backup-2024-05-01.zip`.
    pub name: String,
    pub bytes: Vec<u8>,
    pub tables: Vec<TableSummary>,
}

pub fn archive_name(prefix: &str, date: NaiveDate) -> String {
    format!("{prefix}-{}.zip", date.format("%Y-%m-%d"))
}

/// Build a backup zip with one folder per table holding that table's rows in
/// every archive format. Tables are fetched one at a time; empty tables are
/// left out.
pub fn build_archive(
    store: &dyn SubmissionStore,
    selection: Option<Table>,
    prefix: &str,
    date: NaiveDate,
) -> Result<Archive> {
    let tables: Vec<Table> = match selection {
        Some(table) => vec![table],
        None => ALL_TABLES.to_vec(),
    };
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut summaries = Vec::new();

    for table in tables {
        let rows = store.select(table, &Filter::default())?;
        if rows.is_empty() {
            tracing::debug!(table = %table, "no rows, skipping");
            continue;
        }

        let key = table.key();
        zip.add_directory(format!("{key}/"), options)?;
        let mut files = Vec::new();
        for file in encode_table(&rows, table.name())? {
            let path = format!("{key}/{key}.{}", file.format.extension());
            zip.start_file(path.as_str(), options)?;
            zip.write_all(&file.bytes)?;
            files.push(path);
        }
        tracing::debug!(table = %table, rows = rows.len(), files = files.len(), "table added to archive");
        summaries.push(TableSummary {
            table,
            rows: rows.len(),
            files,
        });
    }

    let bytes = zip.finish()?.into_inner();
    let name = archive_name(prefix, date);
    tracing::info!(archive = %name, tables = summaries.len(), bytes = bytes.len(), "backup archive built");
    Ok(Archive {
        name,
        bytes,
        tables: summaries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{RawRecord, SqliteStore};
    use serde_json::{json, Value};
    use std::io::Read;
    use zip::ZipArchive;

    fn seed(store: &SqliteStore) {
        let rows = [
            (Table::QuoteRequests, json!({"company_name": "Acme", "email": "a@acme.test"})),
            (Table::QuoteRequests, json!({"company_name": "Globex", "email": "b@globex.test"})),
            (Table::CallRequests, json!({"name": "Ravi", "phone": "555-0100"})),
        ];
        for (table, row) in rows {
            let record: RawRecord = row.as_object().unwrap().clone();
            store.insert(table, &record).unwrap();
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name("graycup-backup", date()), "graycup-backup-2024-05-01.zip");
    }

    #[test]
    fn test_build_archive_groups_by_table_and_skips_empty() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed(&store);
        let archive = build_archive(&store, None, "graycup-backup", date()).unwrap();
        assert_eq!(archive.name, "graycup-backup-2024-05-01.zip");

        let tables: Vec<Table> = archive.tables.iter().map(|t| t.table).collect();
        assert_eq!(tables, vec![Table::QuoteRequests, Table::CallRequests]);
        assert_eq!(archive.tables[0].rows, 2);

        let mut zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        let names: Vec<String> = zip.file_names().map(str::to_string).collect();
        assert!(names.contains(&"quote_requests/quote_requests.json".to_string()));
        assert!(names.contains(&"quote_requests/quote_requests.csv".to_string()));
        assert!(names.contains(&"call_requests/call_requests.txt".to_string()));
        assert!(!names.iter().any(|n| n.starts_with("contact_submissions")));

        let mut json_text = String::new();
        zip.by_name("quote_requests/quote_requests.json")
            .unwrap()
            .read_to_string(&mut json_text)
            .unwrap();
        let rows: Vec<Value> = serde_json::from_str(&json_text).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.get("created_at").is_some()));
    }

    #[test]
    fn test_build_archive_single_table() {
        let store = SqliteStore::open_in_memory().unwrap();
        seed(&store);
        let archive =
            build_archive(&store, Some(Table::CallRequests), "graycup-backup", date()).unwrap();
        assert_eq!(archive.tables.len(), 1);
        let zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        assert!(zip.file_names().all(|n| n.starts_with("call_requests/")));
    }

    #[test]
    fn test_build_archive_with_no_rows_is_still_valid() {
        let store = SqliteStore::open_in_memory().unwrap();
        let archive = build_archive(&store, None, "graycup-backup", date()).unwrap();
        assert!(archive.tables.is_empty());
        let zip = ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
        assert_eq!(zip.len(), 0);
    }
}
