use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::export::SubtitleFormat;
use crate::file_utils::FileManager;
use crate::state::StateStore;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Format of the exported subtitle documents
    #[serde(default)]
    pub export_format: SubtitleFormat,

    /// How long the provisional cue of a row in progress stays on screen, in seconds
    #[serde(default = "default_preview_window_secs")]
    pub preview_window_secs: u64,

    /// Location of the saved editor state (defaults to the platform data directory)
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_preview_window_secs() -> u64 {
    60
}

// Upper bound for the preview window; longer provisional cues hide their successors
const MAX_PREVIEW_WINDOW_SECS: u64 = 3600;

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.preview_window_secs == 0 {
            return Err(anyhow!("preview_window_secs must be greater than zero"));
        }
        if self.preview_window_secs > MAX_PREVIEW_WINDOW_SECS {
            return Err(anyhow!(
                "preview_window_secs must not exceed {} (got {})",
                MAX_PREVIEW_WINDOW_SECS,
                self.preview_window_secs
            ));
        }
        if let Some(path) = &self.state_file {
            if path.as_os_str().is_empty() {
                return Err(anyhow!("state_file must not be empty when set"));
            }
        }
        Ok(())
    }

    pub fn preview_window(&self) -> Duration {
        Duration::from_secs(self.preview_window_secs)
    }

    /// State store at the configured location or the platform default
    pub fn state_store(&self) -> Result<StateStore> {
        match &self.state_file {
            Some(path) => Ok(StateStore::new(path.clone())),
            None => StateStore::new_default().context("Failed to locate the application state file"),
        }
    }

    /// Load the configuration file, writing a default one if it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();
        if FileManager::file_exists(config_path) {
            let content = FileManager::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)
                .context(format!("Failed to parse config file: {}", config_path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", config_path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_to_file(config_path, &config_json)
            .context("Failed to write default config")?;
        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            export_format: SubtitleFormat::default(),
            preview_window_secs: default_preview_window_secs(),
            state_file: None,
            log_level: LogLevel::default(),
        }
    }
}
