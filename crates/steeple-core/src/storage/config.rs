//! TOML-based application configuration.
//!
//! Stores the gathering roster and kiosk settings at
//! `~/.config/steeple/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::schedule::Gathering;

/// Kiosk-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KioskConfig {
    /// Gathering the kiosk opens with, by id or name.
    #[serde(default)]
    pub default_gathering: Option<String>,
    /// Minutes before the end time at which check-out begins; falls back
    /// to [`crate::kiosk::CHECKOUT_LEAD_MINUTES`] when absent.
    #[serde(default)]
    pub checkout_lead_minutes: Option<i64>,
}

impl KioskConfig {
    /// Effective checkout lead, applying the default when unset.
    pub fn checkout_lead(&self) -> i64 {
        self.checkout_lead_minutes
            .unwrap_or(crate::kiosk::CHECKOUT_LEAD_MINUTES)
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            default_gathering: None,
            checkout_lead_minutes: None,
        }
    }
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/steeple/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gatherings: Vec<Gathering>,
    #[serde(default)]
    pub kiosk: KioskConfig,
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/steeple"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Load the configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load the configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save the configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Save the configuration to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Find a gathering by id or, failing that, by case-insensitive name.
    pub fn find_gathering(&self, id_or_name: &str) -> Result<&Gathering, ConfigError> {
        self.gatherings
            .iter()
            .find(|g| g.id == id_or_name)
            .or_else(|| {
                self.gatherings
                    .iter()
                    .find(|g| g.name.eq_ignore_ascii_case(id_or_name))
            })
            .ok_or_else(|| ConfigError::UnknownGathering(id_or_name.to_string()))
    }
}
