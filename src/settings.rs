//! User settings stored as settings.json in the app data directory

use crate::constants::{DEFAULT_EXPIRY_WINDOW_DAYS, MAX_EXPIRY_WINDOW_DAYS};
use crate::types::TableColumn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Hidden table columns, keyed by TableColumn::key
    pub hidden_columns: BTreeMap<String, bool>,

    // Files
    pub last_file: Option<PathBuf>,
    pub last_dir: Option<PathBuf>,
    pub reopen_last_file: bool,

    // Maintenance expiry warning window
    pub expiry_window_days: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            hidden_columns: BTreeMap::new(),
            last_file: None,
            last_dir: None,
            reopen_last_file: true,
            expiry_window_days: DEFAULT_EXPIRY_WINDOW_DAYS,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        let mut settings = match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str::<Settings>(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        };
        if settings.expiry_window_days < 1 {
            warn!(days = settings.expiry_window_days, "Invalid expiry window, using default");
            settings.expiry_window_days = DEFAULT_EXPIRY_WINDOW_DAYS;
        } else if settings.expiry_window_days > MAX_EXPIRY_WINDOW_DAYS {
            warn!(days = settings.expiry_window_days, "Expiry window too large, clamping");
            settings.expiry_window_days = MAX_EXPIRY_WINDOW_DAYS;
        }
        settings
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    pub fn is_column_visible(&self, col: TableColumn) -> bool {
        !self.hidden_columns.get(col.key()).copied().unwrap_or(false)
    }

    pub fn set_column_visible(&mut self, col: TableColumn, visible: bool) {
        if visible {
            self.hidden_columns.remove(col.key());
        } else {
            self.hidden_columns.insert(col.key().to_string(), true);
        }
    }

    /// Starting directory for file dialogs
    pub fn dialog_dir(&self) -> PathBuf {
        self.last_dir
            .clone()
            .filter(|d| d.is_dir())
            .or_else(dirs::document_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"window_w": 1200.0}"#).unwrap();
        let settings = Settings::load(dir.path());
        assert_eq!(settings.window_w, Some(1200.0));
        assert_eq!(settings.expiry_window_days, DEFAULT_EXPIRY_WINDOW_DAYS);
        assert!(settings.reopen_last_file);
    }

    #[test]
    fn corrupt_or_invalid_values_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
        assert_eq!(Settings::load(dir.path()).expiry_window_days, DEFAULT_EXPIRY_WINDOW_DAYS);

        std::fs::write(dir.path().join("settings.json"), r#"{"expiry_window_days": 0}"#).unwrap();
        assert_eq!(Settings::load(dir.path()).expiry_window_days, DEFAULT_EXPIRY_WINDOW_DAYS);
    }

    #[test]
    fn oversized_expiry_window_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), r#"{"expiry_window_days": 100000000}"#).unwrap();
        assert_eq!(Settings::load(dir.path()).expiry_window_days, MAX_EXPIRY_WINDOW_DAYS);
    }

    #[test]
    fn column_visibility_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.set_column_visible(TableColumn::Note, false);
        settings.last_file = Some(PathBuf::from("register.xlsx"));
        settings.save(dir.path());

        let loaded = Settings::load(dir.path());
        assert!(!loaded.is_column_visible(TableColumn::Note));
        assert!(loaded.is_column_visible(TableColumn::AssetId));
        assert_eq!(loaded.last_file, Some(PathBuf::from("register.xlsx")));
    }
}
