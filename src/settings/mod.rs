//! Settings providers.
//!
//! The engine reads the user's cue settings once per session through a
//! [`SettingsProvider`]. Providers never fail: anything unreadable falls
//! back to [`Settings::default`].

mod error;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::types::Settings;

pub use error::SettingsError;

/// File name of the settings file inside the config directory.
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Source of the current cue settings.
pub trait SettingsProvider {
    /// Returns the settings in effect right now.
    fn current_settings(&self) -> Settings;
}

/// Default settings file: `<config dir>/meditimer/settings.json`.
#[must_use]
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meditimer")
        .join(SETTINGS_FILE_NAME)
}

/// Provider holding a fixed value that can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticSettingsProvider {
    settings: Mutex<Settings>,
}

impl StaticSettingsProvider {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }

    /// Replaces the value returned from now on.
    pub fn set(&self, settings: Settings) {
        *self.settings.lock().unwrap_or_else(|e| e.into_inner()) = settings;
    }
}

impl SettingsProvider for StaticSettingsProvider {
    fn current_settings(&self) -> Settings {
        *self.settings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Provider reading a JSON settings file on every call.
#[derive(Debug, Clone)]
pub struct FileSettingsProvider {
    path: PathBuf,
}

impl FileSettingsProvider {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the settings file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the settings file.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Read` if the file cannot be read and
    /// `SettingsError::Parse` if it is not valid settings JSON.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let json = std::fs::read_to_string(&self.path)
            .map_err(|e| SettingsError::Read(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&json).map_err(|e| SettingsError::Parse(e.to_string()))
    }
}

impl Default for FileSettingsProvider {
    fn default() -> Self {
        Self::new(default_settings_path())
    }
}

impl SettingsProvider for FileSettingsProvider {
    fn current_settings(&self) -> Settings {
        if !self.path.exists() {
            debug!("No settings file at {}, using defaults", self.path.display());
            return Settings::default();
        }
        self.load().unwrap_or_else(|e| {
            warn!("Using default settings: {}", e);
            Settings::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider() {
        let provider = StaticSettingsProvider::new(Settings::default().with_sound_enabled(false));
        assert!(!provider.current_settings().sound_enabled);

        provider.set(Settings::default());
        assert!(provider.current_settings().sound_enabled);
    }

    #[test]
    fn test_file_provider_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileSettingsProvider::new(dir.path().join("settings.json"));
        assert_eq!(provider.current_settings(), Settings::default());
    }

    #[test]
    fn test_file_provider_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ nope").unwrap();

        let provider = FileSettingsProvider::new(&path);
        assert!(matches!(provider.load(), Err(SettingsError::Parse(_))));
        assert_eq!(provider.current_settings(), Settings::default());
    }

    #[test]
    fn test_file_provider_reads_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"sound_enabled": false, "vibration_strength_percent": 250, "screen_dim_percent": 10}"#,
        )
        .unwrap();

        let settings = FileSettingsProvider::new(&path).current_settings();
        assert!(!settings.sound_enabled);
        assert_eq!(settings.vibration_strength_percent, 100);
        assert_eq!(settings.screen_dim_percent, 10);
    }

    #[test]
    fn test_default_settings_path() {
        assert!(default_settings_path().ends_with("meditimer/settings.json"));
    }
}
