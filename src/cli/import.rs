use colored::Colorize;

use crate::batch::BatchImportResult;
use crate::error::Result;
use crate::restore::import_files;
use crate::tables::Table;

/// How many error lines to print per file before summarizing the rest.
const SHOWN_ERRORS: usize = 3;

pub fn run(files: &[String], table: Option<&str>) -> Result<()> {
    let table = table.map(Table::from_key).transpose()?;
    let (_, store) = super::open_default_store()?;

    let results = import_files(&store, files, table);
    for result in &results {
        for line in report_lines(result) {
            println!("{line}");
        }
    }

    let success: usize = results.iter().map(|r| r.success).sum();
    let failed: usize = results.iter().map(|r| r.failed).sum();
    println!();
    println!(
        "{} imported, {} failed across {} file(s)",
        success.to_string().green(),
        if failed > 0 { failed.to_string().red() } else { failed.to_string().normal() },
        results.len()
    );
    Ok(())
}

fn report_lines(result: &BatchImportResult) -> Vec<String> {
    let status = if result.errors.is_empty() && result.failed == 0 {
        "ok".green()
    } else if result.success > 0 {
        "partial".yellow()
    } else {
        "failed".red()
    };
    let mut lines = vec![format!(
        "[{status}] {}: {} imported, {} failed",
        result.table, result.success, result.failed
    )];

    for err in result.errors.iter().take(SHOWN_ERRORS) {
        lines.push(format!("    {err}"));
    }
    let more = result.errors.len().saturating_sub(SHOWN_ERRORS) + result.hidden_errors();
    if more > 0 {
        lines.push(format!("    ...and {more} more errors"));
    }
    lines
}
