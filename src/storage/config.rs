//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory. Every section
//! has defaults, so a missing file or a missing section is not an error.

use crate::audio::SoundCategory;
use crate::preferences::ColorScheme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Storage settings
    pub storage: StorageSettings,
    /// Profile settings
    pub profiles: ProfileSettings,
    /// Announcer settings
    pub announcer: AnnouncerSettings,
    /// Sound feedback settings
    pub sound: SoundSettings,
    /// OS preference overrides
    pub os: OsSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            storage: StorageSettings::default(),
            profiles: ProfileSettings::default(),
            announcer: AnnouncerSettings::default(),
            sound: SoundSettings::default(),
            os: OsSettings::default(),
        }
    }
}

impl AppConfig {
    /// Path of the preference database.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.storage.database_file)
    }

    /// Directory holding the sound files.
    pub fn sound_dir(&self) -> PathBuf {
        self.sound
            .directory
            .clone()
            .unwrap_or_else(|| self.data_dir.join("sounds"))
    }
}

/// Storage-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Database file name inside the data directory
    pub database_file: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_file: "a11y.db".to_string(),
        }
    }
}

/// Profile-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSettings {
    /// Maximum number of backups kept; the oldest is evicted first
    pub max_backups: usize,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self { max_backups: 10 }
    }
}

/// Live announcer timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerSettings {
    /// Delay between clearing a live region and writing the new text
    pub clear_delay_ms: u64,
    /// Window in which an identical message is delivered only once
    pub dedup_window_ms: u64,
    /// Tick interval of the async driver
    pub tick_interval_ms: u64,
}

impl Default for AnnouncerSettings {
    fn default() -> Self {
        Self {
            clear_delay_ms: 100,
            dedup_window_ms: 1000,
            tick_interval_ms: 16,
        }
    }
}

impl AnnouncerSettings {
    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_millis(self.dedup_window_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Sound feedback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSettings {
    /// Directory with the sound files (defaults to `<data_dir>/sounds`)
    pub directory: Option<PathBuf>,
    /// File name per category, keyed by category name
    pub files: BTreeMap<String, String>,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            directory: None,
            files: SoundCategory::ALL
                .iter()
                .map(|c| (c.as_str().to_string(), c.default_file().to_string()))
                .collect(),
        }
    }
}

impl SoundSettings {
    /// File for a category, falling back to the built-in name.
    pub fn file_for(&self, category: SoundCategory) -> &str {
        self.files
            .get(category.as_str())
            .map(String::as_str)
            .unwrap_or_else(|| category.default_file())
    }
}

/// Overrides for OS preferences that the desktop does not report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OsSettings {
    pub reduced_motion: Option<bool>,
    pub high_contrast: Option<bool>,
    pub color_scheme: Option<ColorScheme>,
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "netwatch", "NetWatch")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load application configuration from a file.
pub fn load_config_from(path: &std::path::Path) -> Result<AppConfig, ConfigError> {
    let data_dir = path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(get_data_dir);

    if !path.exists() {
        let config = AppConfig {
            data_dir,
            ..Default::default()
        };
        return Ok(config);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = data_dir;

    Ok(config)
}

/// Save application configuration to a file.
pub fn save_config(config: &AppConfig, path: &std::path::Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
