//! Configuration management for incidentlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "incidentlog";

/// Directory under the data dir that holds database files.
const DATABASE_DIR_NAME: &str = "SQLite";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "911.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `INCIDENTLOG_`)
/// 2. TOML config file at `~/.config/incidentlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Media capture configuration.
    pub media: MediaConfig,
    /// Playback configuration.
    pub playback: PlaybackConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/incidentlog/SQLite/911.db`
    pub database_path: Option<PathBuf>,
    /// Seed database copied into place on first run.
    /// When unset, an empty database is created instead.
    pub seed_path: Option<PathBuf>,
}

/// Media capture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Largest accepted photo, in raw bytes.
    pub max_photo_bytes: u64,
    /// Largest accepted audio clip, in raw bytes.
    pub max_audio_bytes: u64,
    /// File extensions offered by the audio picker.
    pub audio_extensions: Vec<String>,
    /// File extensions accepted as images.
    pub image_extensions: Vec<String>,
}

/// Playback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Output volume; 1.0 is unchanged.
    pub volume: f32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_photo_bytes: 10 * 1024 * 1024,
            max_audio_bytes: 25 * 1024 * 1024,
            audio_extensions: default_audio_extensions(),
            image_extensions: default_image_extensions(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}

fn default_audio_extensions() -> Vec<String> {
    ["mp3", "m4a", "aac", "wav", "ogg", "oga", "opus", "flac"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_image_extensions() -> Vec<String> {
    ["png", "jpg", "jpeg", "gif", "webp", "heic"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `INCIDENTLOG_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("INCIDENTLOG_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.media.max_photo_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "max_photo_bytes must be greater than 0".to_string(),
            });
        }

        if self.media.max_audio_bytes == 0 {
            return Err(Error::ConfigValidation {
                message: "max_audio_bytes must be greater than 0".to_string(),
            });
        }

        if self.media.audio_extensions.is_empty() {
            return Err(Error::ConfigValidation {
                message: "audio_extensions must list at least one extension".to_string(),
            });
        }

        if self.media.image_extensions.is_empty() {
            return Err(Error::ConfigValidation {
                message: "image_extensions must list at least one extension".to_string(),
            });
        }

        for ext in self
            .media
            .audio_extensions
            .iter()
            .chain(&self.media.image_extensions)
        {
            if ext.starts_with('.') || ext.chars().any(char::is_uppercase) {
                return Err(Error::ConfigValidation {
                    message: format!("extension '{ext}' must be lower-case without a dot"),
                });
            }
        }

        if !(0.0..=2.0).contains(&self.playback.volume) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "volume ({}) must be between 0.0 and 2.0",
                    self.playback.volume
                ),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage.database_path.clone().unwrap_or_else(|| {
            Self::default_data_dir()
                .join(DATABASE_DIR_NAME)
                .join(DATABASE_FILE_NAME)
        })
    }
}
