pub mod export;
pub mod import;
pub mod init;
pub mod serve;
pub mod submissions;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::settings::Settings;
use crate::store::SqliteStore;

#[derive(Parser)]
#[command(name = "formdesk", about = "Back office for website form submissions.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for formdesk data (default: ~/.local/share/formdesk)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Run the HTTP API.
    Serve {
        /// Address to listen on (default from settings)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Write a backup zip of one or all tables.
    Export {
        /// Table key, or "all"
        #[arg(long, default_value = "all")]
        table: String,
        /// Output path (default: <data-dir>/backups/<archive name>)
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Restore JSON or CSV backup files.
    Import {
        /// Files to import
        #[arg(required = true)]
        files: Vec<String>,
        /// Table key; detected from each file name when omitted
        #[arg(long)]
        table: Option<String>,
    },
    /// List submissions in a table.
    List {
        table: String,
        /// Only resolved submissions
        #[arg(long, conflicts_with = "pending")]
        resolved: bool,
        /// Only pending submissions
        #[arg(long)]
        pending: bool,
        /// Case-insensitive text filter
        #[arg(long)]
        search: Option<String>,
    },
    /// Mark a submission resolved.
    Resolve {
        table: String,
        id: String,
        /// Mark it pending again instead
        #[arg(long)]
        pending: bool,
    },
    /// Delete a submission.
    Delete { table: String, id: String },
    /// Show settings and per-table counts.
    Status,
}

pub(crate) fn open_store(settings: &Settings) -> Result<SqliteStore> {
    std::fs::create_dir_all(&settings.data_dir)?;
    SqliteStore::open(&settings.db_path())
}

pub(crate) fn open_default_store() -> Result<(Settings, SqliteStore)> {
    let settings = Settings::load();
    let store = open_store(&settings)?;
    Ok((settings, store))
}
