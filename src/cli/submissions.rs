use comfy_table::{Cell, Table as TextTable};

use crate::error::{FormdeskError, Result};
use crate::fmt::format_bytes;
use crate::mapper::{display_value, to_presentation, PresentationRecord};
use crate::store::{Filter, SubmissionStore};
use crate::tables::{Table, ALL_TABLES};

const LIST_HEADER: [&str; 5] = ["ID", "Date", "Status", "From", "Contact"];

fn field(record: &PresentationRecord, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .map(display_value)
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

fn summary_row(record: &PresentationRecord) -> Vec<String> {
    vec![
        field(record, &["ID"]),
        field(record, &["Date"]),
        field(record, &["Status"]),
        field(record, &["Name", "Company Name"]),
        field(record, &["Email", "Phone"]),
    ]
}

fn resolved_filter(resolved: bool, pending: bool) -> Option<bool> {
    match (resolved, pending) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

pub fn list(table: &str, resolved: bool, pending: bool, search: Option<String>) -> Result<()> {
    let table = Table::from_key(table)?;
    let (_, store) = super::open_default_store()?;
    let filter = Filter {
        resolved: resolved_filter(resolved, pending),
        search,
    };
    let rows = store.select(table, &filter)?;

    let mut out = TextTable::new();
    out.set_header(LIST_HEADER.to_vec());
    for raw in &rows {
        out.add_row(summary_row(&to_presentation(raw)).into_iter().map(Cell::new));
    }
    println!("{} ({})\n{out}", table.name(), rows.len());
    Ok(())
}

pub(crate) fn set_resolved(
    store: &dyn SubmissionStore,
    table: Table,
    id: &str,
    resolved: bool,
) -> Result<()> {
    if store.set_resolved(table, id, resolved)? == 0 {
        return Err(not_found(table, id));
    }
    Ok(())
}

pub(crate) fn delete_one(store: &dyn SubmissionStore, table: Table, id: &str) -> Result<()> {
    if store.delete(table, id)? == 0 {
        return Err(not_found(table, id));
    }
    Ok(())
}

fn not_found(table: Table, id: &str) -> FormdeskError {
    FormdeskError::Validation(format!("No submission {id} in {}", table.key()))
}

pub fn resolve(table: &str, id: &str, pending: bool) -> Result<()> {
    let table = Table::from_key(table)?;
    let (_, store) = super::open_default_store()?;
    set_resolved(&store, table, id, !pending)?;
    println!(
        "Marked {id} as {}",
        if pending { "pending" } else { "resolved" }
    );
    Ok(())
}

pub fn delete(table: &str, id: &str) -> Result<()> {
    let table = Table::from_key(table)?;
    let (_, store) = super::open_default_store()?;
    delete_one(&store, table, id)?;
    println!("Deleted {id} from {}", table.name());
    Ok(())
}

pub fn status() -> Result<()> {
    let (settings, store) = super::open_default_store()?;
    let db_path = settings.db_path();

    println!("Data dir:   {}", settings.data_dir);
    println!("Database:   {}", db_path.display());
    if let Ok(meta) = std::fs::metadata(&db_path) {
        println!("DB size:    {}", format_bytes(meta.len()));
    }
    println!("Listen on:  {}", settings.bind_addr);
    println!();

    let mut out = TextTable::new();
    out.set_header(vec!["Table", "Total", "Pending"]);
    for t in ALL_TABLES {
        out.add_row(vec![
            Cell::new(t.name()),
            Cell::new(store.count(*t, None)?),
            Cell::new(store.count(*t, Some(false))?),
        ]);
    }
    println!("{out}");
    Ok(())
}
