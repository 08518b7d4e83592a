use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FormdeskError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_archive_prefix() -> String {
    "graycup-backup".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            bind_addr: default_bind_addr(),
            archive_prefix: default_archive_prefix(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("formdesk.db")
    }

    pub fn backups_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("backups")
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    home().join(".local/share/formdesk")
}

impl Settings {
    /// `~/.config/formdesk/settings.json`
    pub fn config_path() -> PathBuf {
        home().join(".config/formdesk/settings.json")
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Missing keys take their defaults. A missing file gives the defaults;
    /// an unreadable one is logged and ignored.
    pub fn load_from(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "settings unreadable, using defaults");
                return Self::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "settings invalid, using defaults");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| FormdeskError::Settings(e.to_string()))?;
        std::fs::write(path, format!("{json}\n"))?;
        Ok(())
    }
}

/// Resolve a user-supplied directory: `~` expands to the home directory,
/// existing paths are made absolute.
pub fn expand_home(path: &str) -> PathBuf {
    let expanded = match path.strip_prefix('~') {
        Some(rest) => home().join(rest.trim_start_matches('/')),
        None => PathBuf::from(path),
    };
    std::fs::canonicalize(&expanded).unwrap_or(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/settings.json");
        let settings = Settings {
            data_dir: "/tmp/formdesk".to_string(),
            bind_addr: "0.0.0.0:8080".to_string(),
            archive_prefix: "acme-backup".to_string(),
            log_level: "debug".to_string(),
        };
        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.data_dir, "/tmp/formdesk");
        assert_eq!(loaded.bind_addr, "0.0.0.0:8080");
        assert_eq!(loaded.archive_prefix, "acme-backup");
        assert_eq!(loaded.log_level, "debug");
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.bind_addr, "127.0.0.1:3000");
        assert_eq!(s.archive_prefix, "graycup-backup");
        assert_eq!(s.log_level, "info");
        assert!(s.db_path().ends_with("formdesk.db"));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"data_dir": "/srv/formdesk"}"#).unwrap();
        let s = Settings::load_from(&path);
        assert_eq!(s.data_dir, "/srv/formdesk");
        assert_eq!(s.bind_addr, "127.0.0.1:3000");
        assert_eq!(s.backups_dir(), PathBuf::from("/srv/formdesk/backups"));
    }

    #[test]
    fn test_load_missing_or_invalid_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = Settings::load_from(&dir.path().join("nope.json"));
        assert_eq!(missing.bind_addr, "127.0.0.1:3000");

        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Settings::load_from(&path).log_level, "info");
    }

    #[test]
    fn test_expand_home() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_home("~/formdesk-data-missing"), home.join("formdesk-data-missing"));
        assert_eq!(expand_home("/no/such/dir"), PathBuf::from("/no/such/dir"));
    }
}
