use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::modules::search::SearchEngine;

pub const SETTINGS_FILE: &str = "settings.json";

/// The flat preferences record shared by the browser and the mail client.
///
/// Every field is a free-form string, stored as-is. Missing keys fall back
/// to their defaults when the file is read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub search_engine: String,
    pub smtp_server: String,
    pub smtp_port: String,
    pub imap_server: String,
    pub imap_port: String,
    pub email: String,
    pub password: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_engine: SearchEngine::default().name().to_string(),
            smtp_server: String::new(),
            smtp_port: String::new(),
            imap_server: String::new(),
            imap_port: String::new(),
            email: String::new(),
            password: String::new(),
        }
    }
}

impl Settings {
    pub fn search_engine(&self) -> SearchEngine {
        SearchEngine::from_name(&self.search_engine)
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("{path} is not a valid settings file: {source}")]
    Malformed { path: PathBuf, source: serde_json::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Reads and writes the settings record at a single location.
///
/// There is no locking: concurrent writers race and the last `save` wins.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record, substituting defaults when the file is missing,
    /// unreadable or malformed. Failures are logged, never returned.
    pub fn load(&self) -> Settings {
        self.try_load().unwrap_or_else(|e| {
            log::warn!("[Settings] {}, returning defaults", e);
            Settings::default()
        })
    }

    /// Like [`load`](Self::load), but reports unreadable or malformed files
    /// so the caller can tell the user. A missing file is not an error.
    pub fn try_load(&self) -> Result<Settings, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| SettingsError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the whole file with `settings`.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(settings)?;

        // Write to tmp, then rename, so a crash never leaves a half-written file.
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(write_err)?;

        log::info!("[Settings] Saved to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Settings {
        Settings {
            search_engine: "Bing".to_string(),
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: "587".to_string(),
            imap_server: "imap.example.com".to_string(),
            imap_port: "993".to_string(),
            email: "me@example.com".to_string(),
            password: "hunter2".to_string(),
        }
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());

        let settings = store.try_load().unwrap();
        assert_eq!(settings.search_engine, "Google");
        assert_eq!(settings.search_engine(), SearchEngine::Google);
        assert!(settings.email.is_empty());
        assert!(settings.password.is_empty());
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn save_then_load_returns_same_record() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());

        store.save(&sample()).unwrap();
        assert_eq!(store.load(), sample());
        assert!(!dir.path().join("settings.tmp").exists());
    }

    #[test]
    fn save_overwrites_rather_than_merges() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());

        store.save(&sample()).unwrap();
        store.save(&Settings::default()).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, Settings::default());
        assert!(loaded.imap_server.is_empty());
    }

    #[test]
    fn absent_keys_take_defaults() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        fs::write(store.path(), r#"{"email": "me@example.com"}"#).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.email, "me@example.com");
        assert_eq!(loaded.search_engine, "Google");
        assert!(loaded.smtp_port.is_empty());
    }

    #[test]
    fn malformed_file_is_reported_by_try_load_and_masked_by_load() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.try_load(), Err(SettingsError::Malformed { .. })));
        assert_eq!(store.load(), Settings::default());
    }

    #[test]
    fn unknown_provider_is_kept_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        fs::write(store.path(), r#"{"search_engine": "Yahoo"}"#).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.search_engine, "Yahoo");
        assert_eq!(loaded.search_engine(), SearchEngine::DuckDuckGo);
    }

    #[test]
    fn save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(&dir.path().join("nested").join("app"));

        store.save(&sample()).unwrap();
        assert!(store.path().exists());
    }
}
