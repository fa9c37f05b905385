use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MaplistError;

const APP_DIR: &str = "maplist-generator";
const SETTINGS_FILE: &str = "config.json";

/// Values remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub output_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new() -> Result<Self, MaplistError> {
        Self::in_config_dir(BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()))
    }

    pub fn in_config_dir(config_dir: Option<PathBuf>) -> Result<Self, MaplistError> {
        let dir = config_dir.ok_or_else(|| {
            MaplistError::Filesystem("unable to resolve config directory".to_string())
        })?;
        Ok(Self::new_with_path(dir.join(APP_DIR).join(SETTINGS_FILE)))
    }

    /// Settings only pre-fill arguments, so a store that cannot be located
    /// degrades to running without one.
    pub fn locate_or_warn(config_dir: Option<PathBuf>) -> Option<Self> {
        match Self::in_config_dir(config_dir) {
            Ok(store) => Some(store),
            Err(err) => {
                warn!(error = %err, "running without remembered settings");
                None
            }
        }
    }

    pub fn new_with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing, unreadable or broken files all yield defaults.
    pub fn load(&self) -> Settings {
        match self.read() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring settings file");
                Settings::default()
            }
        }
    }

    pub fn load_from(store: Option<&Self>) -> Settings {
        store.map(Self::load).unwrap_or_default()
    }

    pub fn read(&self) -> Result<Option<Settings>, MaplistError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|_| MaplistError::SettingsRead(self.path.clone()))?;
        let settings = serde_json::from_str(&content)
            .map_err(|err| MaplistError::SettingsParse(err.to_string()))?;
        Ok(Some(settings))
    }

    pub fn save(&self, settings: &Settings) -> Result<(), MaplistError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| MaplistError::Filesystem(err.to_string()))?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(settings)
            .map_err(|err| MaplistError::Filesystem(err.to_string()))?;
        fs::write(&tmp_path, &content).map_err(|err| MaplistError::Filesystem(err.to_string()))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|err| MaplistError::Filesystem(err.to_string()))?;
        Ok(())
    }
}
