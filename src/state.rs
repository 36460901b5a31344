/*!
 * Persisted application state.
 *
 * The editor keeps its rows and the reference video path in a single JSON
 * document. It is loaded once at startup and rewritten after every change to
 * the row collection or the video path.
 */

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::StateError;
use crate::timeline::Row;

// @const: State file name inside the data directory
pub const STATE_FILE_NAME: &str = "appState.json";

/// Everything the editor restores on startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub subtitles: Vec<Row>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
}

// @const: Suffix of the copy kept when the state file cannot be read
pub const BACKUP_SUFFIX: &str = "bak";

/// JSON file holding the `AppState`
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,

    // @field: Set when an unreadable state file could not be moved aside;
    // saving would destroy it
    locked: bool,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), locked: false }
    }

    /// Store in the platform data directory (`<data_dir>/tricue/appState.json`)
    pub fn new_default() -> Result<Self, StateError> {
        Ok(Self::new(Self::default_path()?))
    }

    pub fn default_path() -> Result<PathBuf, StateError> {
        let dir = dirs::data_dir().ok_or(StateError::NoDataDir)?;
        Ok(dir.join("tricue").join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable state file is moved (`appState.json.bak`)
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".");
        name.push(BACKUP_SUFFIX);
        self.path.with_file_name(name)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Read the saved state; `Ok(None)` when nothing has been saved yet
    pub fn try_load(&self) -> Result<Option<AppState>, StateError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&content)?;
        Ok(Some(state))
    }

    /// Read the saved state, treating an unreadable file as no state.
    ///
    /// The unreadable file is moved to `backup_path()` so later saves cannot
    /// overwrite it; if that fails the store refuses to save.
    pub fn load(&mut self) -> Option<AppState> {
        match self.try_load() {
            Ok(state) => state,
            Err(e) => {
                warn!("Ignoring saved state at {}: {}", self.path.display(), e);
                self.set_aside();
                None
            }
        }
    }

    fn set_aside(&mut self) {
        let backup = self.backup_path();
        match fs::rename(&self.path, &backup) {
            Ok(()) => warn!("Unreadable state file kept as {}", backup.display()),
            Err(e) => {
                error!(
                    "Could not move unreadable state file {} aside ({}), saving is disabled",
                    self.path.display(),
                    e
                );
                self.locked = true;
            }
        }
    }

    pub fn save(&self, state: &AppState) -> Result<(), StateError> {
        if self.locked {
            return Err(StateError::Locked(self.path.clone()));
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(state)?;
        fs::write(&self.path, json)?;
        debug!("Saved {} rows to {}", state.subtitles.len(), self.path.display());
        Ok(())
    }

    /// Fire-and-forget save: failures are logged, never returned
    pub fn persist(&self, state: &AppState) {
        if let Err(e) = self.save(state) {
            warn!("Failed to save application state: {}", e);
        }
    }
}
