//! Configuration file support for DataMark.
//!
//! Settings live in a versioned JSON file. Missing fields fall back to
//! defaults, so older files keep loading after new settings are added.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    API_URL_ENV, DEFAULT_API_URL, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH,
    DEFAULT_INPUT_CAPACITY,
};
use crate::export::ExportOptions;
use crate::input::KeyBindings;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Where annotations are stored
    #[serde(default)]
    pub store: StoreConfig,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Keybinding configuration
    #[serde(default)]
    pub keybindings: KeyBindings,

    /// Dataset export settings
    #[serde(default)]
    pub export: ExportOptions,
}

/// Store section of the config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the annotation API server
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Width of the headless canvas
    #[serde(default = "default_canvas_width")]
    pub canvas_width: f64,

    /// Height of the headless canvas
    #[serde(default = "default_canvas_height")]
    pub canvas_height: f64,

    /// Capacity of the merged input queue
    #[serde(default = "default_input_capacity")]
    pub input_capacity: usize,
}

fn default_canvas_width() -> f64 {
    DEFAULT_CANVAS_WIDTH
}

fn default_canvas_height() -> f64 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_input_capacity() -> usize {
    DEFAULT_INPUT_CAPACITY
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            input_capacity: default_input_capacity(),
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            store: StoreConfig::default(),
            preferences: UserPreferences::default(),
            keybindings: KeyBindings::default(),
            export: ExportOptions::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default config file name.
    pub fn default_filename() -> &'static str {
        "config.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("datamark").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home| {
                home.join(".config")
                    .join("datamark")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    ///
    /// Nothing is logged here: the log level comes from the loaded file, so
    /// the returned [`ConfigSource`] is reported once the logger is set up.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        if !path.exists() {
            return Ok((Self::new(), ConfigSource::Missing(path.to_path_buf())));
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    /// Load from `path` if there is one. Unreadable or invalid files are
    /// replaced by the defaults and the error is kept in the source.
    pub fn load_or_default(path: Option<PathBuf>) -> (Self, ConfigSource) {
        let Some(path) = path else {
            return (Self::new(), ConfigSource::NoConfigDir);
        };
        Self::load(&path).unwrap_or_else(|e| (Self::new(), ConfigSource::Invalid(path, e)))
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Apply environment overrides, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            log::debug!("{} overrides store URL with {}", API_URL_ENV, url);
            self.store.base_url = url.trim().to_string();
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a loaded configuration came from.
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    NoConfigDir,
    /// The file exists but could not be used; defaults were taken instead.
    Invalid(PathBuf, ConfigError),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => log::info!("Loaded configuration from {:?}", path),
            ConfigSource::Missing(path) => {
                log::debug!("No config file found at {:?}, using defaults", path)
            }
            ConfigSource::NoConfigDir => log::debug!("No config directory, using defaults"),
            ConfigSource::Invalid(path, e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e)
            }
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
