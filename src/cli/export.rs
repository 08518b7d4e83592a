use std::path::PathBuf;

use comfy_table::{Cell, Table as TextTable};

use crate::archive::build_archive;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::tables::Table;

pub(crate) fn parse_selection(table: &str) -> Result<Option<Table>> {
    match table {
        "" | "all" => Ok(None),
        key => Table::from_key(key).map(Some),
    }
}

pub fn run(table: &str, output: Option<String>) -> Result<()> {
    let selection = parse_selection(table)?;
    let (settings, store) = super::open_default_store()?;

    let today = chrono::Local::now().date_naive();
    let archive = build_archive(&store, selection, &settings.archive_prefix, today)?;

    let dest_path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let backups_dir = settings.backups_dir();
            std::fs::create_dir_all(&backups_dir)?;
            backups_dir.join(&archive.name)
        }
    };
    std::fs::write(&dest_path, &archive.bytes)?;

    if archive.tables.is_empty() {
        println!("No submissions to export.");
    } else {
        let mut summary = TextTable::new();
        summary.set_header(vec!["Table", "Rows", "Files"]);
        for t in &archive.tables {
            summary.add_row(vec![
                Cell::new(t.table.name()),
                Cell::new(t.rows),
                Cell::new(t.files.len()),
            ]);
        }
        println!("{summary}");
    }
    println!("Backup saved to {}", dest_path.display());
    println!("Size: {}", format_bytes(archive.bytes.len() as u64));
    Ok(())
}
