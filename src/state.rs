// Shared state handed to every command through `tauri::State`.
// No Tauri imports, so it can be tested without a running app.

use std::sync::{Arc, Mutex, RwLock};

use crate::error::AppResult;
use crate::modules::tabs::ViewContainer;
use crate::settings::{Settings, SettingsError, SettingsStore};

pub struct AppState {
    pub store: SettingsStore,
    /// In-memory copy of the settings file; only refreshed by an explicit
    /// reload or a save, never re-read behind the caller's back.
    pub settings: Arc<RwLock<Settings>>,
    pub views: Arc<Mutex<ViewContainer>>,
    /// Problem found while reading settings at launch, held until the
    /// frontend is ready to show it.
    pub startup_warning: Arc<Mutex<Option<String>>>,
}

impl AppState {
    /// Loads settings from `store`. A broken file falls back to defaults and
    /// leaves a startup warning for the user.
    pub fn new(store: SettingsStore) -> Self {
        let (settings, warning) = match store.try_load() {
            Ok(settings) => (settings, None),
            Err(e) => {
                log::warn!("[Settings] {}, using defaults", e);
                (Settings::default(), Some(e.to_string()))
            }
        };

        Self {
            store,
            settings: Arc::new(RwLock::new(settings)),
            views: Arc::new(Mutex::new(ViewContainer::new())),
            startup_warning: Arc::new(Mutex::new(warning)),
        }
    }

    pub fn settings(&self) -> AppResult<Settings> {
        Ok(self.settings.read()?.clone())
    }

    /// Writes `settings` to disk, then makes them current.
    pub fn save_settings(&self, settings: Settings) -> AppResult<()> {
        self.store.save(&settings)?;
        *self.settings.write()? = settings;
        Ok(())
    }

    /// Re-reads the file. On failure the settings in memory are left alone.
    pub fn reload_settings(&self) -> AppResult<Settings> {
        let fresh = self.store.try_load().map_err(|e: SettingsError| {
            log::warn!("[Settings] Reload failed: {}", e);
            e
        })?;
        *self.settings.write()? = fresh.clone();
        Ok(fresh)
    }

    pub fn take_startup_warning(&self) -> AppResult<Option<String>> {
        Ok(self.startup_warning.lock()?.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn bing() -> Settings {
        Settings {
            search_engine: "Bing".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_fresh_install_has_defaults_and_no_warning() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(SettingsStore::in_dir(dir.path()));

        assert_eq!(state.settings().unwrap(), Settings::default());
        assert_eq!(state.take_startup_warning().unwrap(), None);
        assert_eq!(state.views.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_file_leaves_warning_once() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        fs::write(store.path(), "[1, 2").unwrap();

        let state = AppState::new(store);
        assert_eq!(state.settings().unwrap(), Settings::default());
        assert!(state.take_startup_warning().unwrap().is_some());
        assert_eq!(state.take_startup_warning().unwrap(), None);
    }

    #[test]
    fn test_save_updates_memory_and_disk() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(SettingsStore::in_dir(dir.path()));

        state.save_settings(bing()).unwrap();
        assert_eq!(state.settings().unwrap(), bing());
        assert_eq!(state.store.load(), bing());
    }

    #[test]
    fn test_settings_are_not_reread_until_reload() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        let state = AppState::new(store.clone());

        // Another writer changes the file behind our back
        store.save(&bing()).unwrap();
        assert_eq!(state.settings().unwrap(), Settings::default());

        assert_eq!(state.reload_settings().unwrap(), bing());
        assert_eq!(state.settings().unwrap(), bing());
    }

    #[test]
    fn test_failed_reload_keeps_current_settings() {
        let dir = TempDir::new().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        let state = AppState::new(store.clone());
        state.save_settings(bing()).unwrap();

        fs::write(store.path(), "garbage").unwrap();
        assert!(state.reload_settings().is_err());
        assert_eq!(state.settings().unwrap(), bing());
    }
}
