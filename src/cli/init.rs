use crate::error::Result;
use crate::settings::{expand_home, Settings};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = Settings::load();
    if let Some(dir) = data_dir {
        let path = expand_home(&dir);
        std::fs::create_dir_all(&path)?;
        settings.data_dir = std::fs::canonicalize(&path)?.to_string_lossy().into_owned();
    }
    std::fs::create_dir_all(settings.backups_dir())?;

    // Opening the store creates any missing tables.
    super::open_store(&settings)?;
    settings.save()?;

    println!("Data dir:  {}", settings.data_dir);
    println!("Database:  {}", settings.db_path().display());
    println!("Ready. Run `formdesk serve` to start the API.");
    Ok(())
}
