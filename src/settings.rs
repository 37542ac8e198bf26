//! Persisted client preferences.
//!
//! A missing or corrupt settings file never surfaces as an error: the
//! store falls back to defaults and logs a warning.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub api_endpoint: String,
    /// Realtime refresh interval in seconds.
    pub refresh_interval: u64,
    pub notifications: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_endpoint: "https://api.example.com/v1".to_string(),
            refresh_interval: 30,
            notifications: true,
        }
    }
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub api_endpoint: Option<String>,
    pub refresh_interval: Option<u64>,
    pub notifications: Option<bool>,
}

impl AppSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(endpoint) = update.api_endpoint {
            self.api_endpoint = endpoint;
        }
        if let Some(interval) = update.refresh_interval {
            self.refresh_interval = interval;
        }
        if let Some(enabled) = update.notifications {
            self.notifications = enabled;
        }
    }

    /// Parse stored JSON, keeping defaults for absent fields. Any parse
    /// failure yields plain defaults.
    pub fn from_json_or_default(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable settings, using defaults");
                Self::default()
            }
        }
    }
}

/// Settings shared across handlers, written through to a JSON file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: Arc<Mutex<AppSettings>>,
}

impl SettingsStore {
    /// Load from `path`. Missing or corrupt files yield defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = load(&path);
        Self {
            path: Some(path),
            current: Arc::new(Mutex::new(settings)),
        }
    }

    /// Settings that are never written to disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            current: Arc::new(Mutex::new(AppSettings::default())),
        }
    }

    pub fn get(&self) -> AppSettings {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Merge `update` into the current settings and persist the result.
    pub fn save(&self, update: SettingsUpdate) -> Result<AppSettings, SettingsError> {
        let snapshot = {
            let mut current = self
                .current
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            current.apply(update);
            current.clone()
        };

        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&snapshot)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                    path: path.clone(),
                    source,
                })?;
            }
            std::fs::write(path, json).map_err(|source| SettingsError::Write {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "Settings saved");
        }
        Ok(snapshot)
    }
}

fn load(path: &Path) -> AppSettings {
    match std::fs::read_to_string(path) {
        Ok(raw) => AppSettings::from_json_or_default(&raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No stored settings, using defaults");
            AppSettings::default()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Could not read settings, using defaults");
            AppSettings::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_json_falls_back() {
        assert_eq!(AppSettings::from_json_or_default("{not json"), AppSettings::default());
        assert_eq!(
            AppSettings::from_json_or_default("{\"refreshInterval\": \"soon\"}"),
            AppSettings::default()
        );
    }

    #[test]
    fn test_partial_json_merges_over_defaults() {
        let s = AppSettings::from_json_or_default("{\"refreshInterval\": 5}");
        assert_eq!(s.refresh_interval, 5);
        assert_eq!(s.api_endpoint, "https://api.example.com/v1");
        assert!(s.notifications);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, b"\xff\xfe garbage").unwrap();
        let store = SettingsStore::open(&path);
        assert_eq!(store.get(), AppSettings::default());
    }

    #[test]
    fn test_save_persists_partial_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let store = SettingsStore::open(&path);
        store
            .save(SettingsUpdate {
                notifications: Some(false),
                ..Default::default()
            })
            .unwrap();

        let reopened = SettingsStore::open(&path);
        let s = reopened.get();
        assert!(!s.notifications);
        assert_eq!(s.refresh_interval, 30);
    }

    #[test]
    fn test_in_memory_store() {
        let store = SettingsStore::in_memory();
        let s = store
            .save(SettingsUpdate {
                api_endpoint: Some("http://localhost:9000".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(s.api_endpoint, "http://localhost:9000");
        assert_eq!(store.get().api_endpoint, "http://localhost:9000");
    }
}
