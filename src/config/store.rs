//! JSON persistence for [`Settings`]
//!
//! The store owns the in-memory record. Loading never fails: a missing file is
//! a first run (defaults are written), an unreadable or malformed file falls
//! back to defaults until the next save overwrites it. Saving merges a patch,
//! updates memory first and then writes the whole record atomically.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::settings::{Settings, SettingsPatch};
use crate::constants::config;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read config from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write config to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Settings file next to the running executable.
///
/// Falls back to the XDG config directory if the executable path cannot be
/// resolved.
pub fn default_path() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join(config::FILENAME))
            .unwrap_or_else(|| PathBuf::from(config::FILENAME)),
        Err(e) => {
            warn!(error = %e, "Could not resolve executable path, using config directory");
            let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push(config::APP_DIR);
            path.push(config::FILENAME);
            path
        }
    }
}

#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: Settings,
}

impl ConfigStore {
    /// Create a store for `path` and load it immediately
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            current: Settings::default(),
        };
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last loaded or saved settings
    pub fn settings(&self) -> &Settings {
        &self.current
    }

    /// Read the file and merge its keys over the defaults
    pub fn load(&mut self) -> Settings {
        self.current = match self.read_patch() {
            Ok(patch) => {
                info!(path = %self.path.display(), "Loaded crosshair config");
                Settings::default().merged(patch)
            }
            Err(ConfigError::FileNotFound { .. }) => {
                info!(path = %self.path.display(), "Config file not found, creating default config");
                let defaults = Settings::default();
                if let Err(e) = self.write(&defaults) {
                    warn!(error = %e, "Failed to write default config");
                }
                defaults
            }
            Err(e) => {
                warn!(error = %e, "Using default settings");
                Settings::default()
            }
        };
        self.current.clone()
    }

    /// Merge `patch` into the current settings and persist the full record.
    ///
    /// The merged record stays in memory even if the write fails.
    pub fn save(&mut self, patch: SettingsPatch) -> Result<Settings, ConfigError> {
        self.current.apply(patch);
        self.write(&self.current)?;
        debug!(path = %self.path.display(), "Saved crosshair config");
        Ok(self.current.clone())
    }

    fn read_patch(&self) -> Result<SettingsPatch, ConfigError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let parse_err = |source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        };

        let value: serde_json::Value = serde_json::from_str(&contents).map_err(parse_err)?;
        if !value.is_object() {
            return Err(parse_err(serde::de::Error::custom(
                "expected a JSON object at the top level",
            )));
        }
        serde_json::from_value(value).map_err(parse_err)
    }

    fn write(&self, settings: &Settings) -> Result<(), ConfigError> {
        let json = to_pretty_json(settings)?;
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let tmp = temp_path(&self.path);
        fs::write(&tmp, json).map_err(write_err)?;
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(write_err(source));
        }
        Ok(())
    }
}

fn to_pretty_json(settings: &Settings) -> Result<Vec<u8>, ConfigError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(config::JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    settings
        .serialize(&mut serializer)
        .map_err(ConfigError::Serialize)?;
    Ok(buf)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| config::FILENAME.to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
