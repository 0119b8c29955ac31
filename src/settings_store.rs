use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::{GameSettings, RawSettings};

const STORE_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported settings version {version} at {path}")]
    UnsupportedVersion { version: u8, path: PathBuf },
}

#[derive(Clone, Debug, Serialize)]
struct SettingsStoreFile {
    version: u8,
    #[serde(rename = "savedAt")]
    saved_at: String,
    settings: RawSettings,
}

#[derive(Clone, Debug, Deserialize)]
struct SettingsStoreFileRaw {
    version: u8,
    #[serde(default)]
    settings: serde_json::Value,
}

/// Saved preferences backed by a JSON file.
pub struct SettingsStore {
    file_path: PathBuf,
    settings: GameSettings,
}

impl SettingsStore {
    /// Loads `file_path` if present. Anything unreadable is logged and
    /// replaced by defaults.
    pub fn new(file_path: PathBuf) -> Self {
        let settings = match load_settings(&file_path) {
            Ok(Some(settings)) => settings,
            Ok(None) => GameSettings::default(),
            Err(error) => {
                eprintln!("[settings-store] {error}; using defaults");
                GameSettings::default()
            }
        };
        Self {
            file_path,
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn save(&mut self, settings: &GameSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let payload = SettingsStoreFile {
            version: STORE_VERSION,
            saved_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            settings: settings.to_raw(),
        };
        let text = serde_json::to_string_pretty(&payload).map_err(SettingsError::Serialize)?;
        fs::write(&self.file_path, text).map_err(|source| SettingsError::Io {
            path: self.file_path.clone(),
            source,
        })?;
        self.settings = *settings;
        Ok(())
    }

    /// Forgets saved preferences. A missing file is not an error.
    pub fn reset_to_default(&mut self) -> Result<(), SettingsError> {
        self.settings = GameSettings::default();
        match fs::remove_file(&self.file_path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SettingsError::Io {
                path: self.file_path.clone(),
                source,
            }),
        }
    }
}

/// `Ok(None)` when no file exists yet.
pub fn load_settings(path: &Path) -> Result<Option<GameSettings>, SettingsError> {
    let text = match fs::read_to_string(path) {
        Ok(value) => value,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let parsed: SettingsStoreFileRaw =
        serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if parsed.version != STORE_VERSION {
        return Err(SettingsError::UnsupportedVersion {
            version: parsed.version,
            path: path.to_path_buf(),
        });
    }
    let raw = RawSettings::from_json(&parsed.settings);
    Ok(Some(GameSettings::from_raw(&raw)))
}
