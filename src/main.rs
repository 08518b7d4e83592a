mod api;
mod archive;
mod batch;
mod cli;
mod db;
mod error;
mod fmt;
mod formats;
mod mapper;
mod restore;
mod settings;
mod store;
mod tables;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&settings::Settings::load().log_level);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Serve { bind } => cli::serve::run(bind),
        Commands::Export { table, output } => cli::export::run(&table, output),
        Commands::Import { files, table } => cli::import::run(&files, table.as_deref()),
        Commands::List {
            table,
            resolved,
            pending,
            search,
        } => cli::submissions::list(&table, resolved, pending, search),
        Commands::Resolve { table, id, pending } => cli::submissions::resolve(&table, &id, pending),
        Commands::Delete { table, id } => cli::submissions::delete(&table, &id),
        Commands::Status => cli::submissions::status(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
