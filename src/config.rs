//! Application configuration.
//!
//! Loaded from `config.json` in the OS config directory:
//! - Linux: ~/.config/profile-creator/
//! - macOS: ~/Library/Application Support/profile-creator/
//! - Windows: %APPDATA%\profile-creator\

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ProfileError, Result};
use crate::storage::validate_key;
use crate::store::DEFAULT_STORAGE_KEY;

// =============================================================================
// Config Path
// =============================================================================

const APP_NAME: &str = "profile-creator";
const CONFIG_FILE: &str = "config.json";

/// Get the configuration directory path.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .ok_or_else(|| ProfileError::Config("Could not find config directory".into()))
}

/// Get the full path to the config file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

// =============================================================================
// Config Structure
// =============================================================================

/// Main configuration file structure.
///
/// Every field is optional in the file; directories left unset resolve
/// under the config directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Key the profile snapshot is stored under in both backends.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// Directory of the device-local backend.
    #[serde(default)]
    pub local_dir: Option<PathBuf>,

    /// Directory of the synchronized backend. Point this at a folder that
    /// is replicated between devices.
    #[serde(default)]
    pub remote_dir: Option<PathBuf>,

    /// Profiles allowed per platform when adding from the CLI.
    #[serde(default = "default_max_profiles")]
    pub max_profiles_per_platform: usize,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_max_profiles() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            local_dir: None,
            remote_dir: None,
            max_profiles_per_platform: default_max_profiles(),
        }
    }
}

impl AppConfig {
    /// Local backend directory, defaulting to `<config dir>/local`.
    pub fn local_dir(&self) -> Result<PathBuf> {
        match &self.local_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(get_config_dir()?.join("local")),
        }
    }

    /// Synchronized backend directory, defaulting to `<config dir>/synced`.
    pub fn remote_dir(&self) -> Result<PathBuf> {
        match &self.remote_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(get_config_dir()?.join("synced")),
        }
    }

    fn validate(&self) -> Result<()> {
        validate_key(&self.storage_key)
            .map_err(|e| ProfileError::Config(format!("storageKey: {}", e)))?;
        if let (Some(local), Some(remote)) = (&self.local_dir, &self.remote_dir) {
            if local == remote {
                return Err(ProfileError::Config(
                    "localDir and remoteDir must be different directories".into(),
                ));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Loading and Saving
// =============================================================================

/// Load configuration from the default location.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&get_config_path()?)
}

/// Load configuration from `path`. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ProfileError::Config(format!("Failed to read config: {}", e)))?;

    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| ProfileError::Config(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to `path`, creating parent directories.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| ProfileError::Config(format!("Failed to create config dir: {}", e)))?;
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| ProfileError::Config(format!("Failed to serialize config: {}", e)))?;

    std::fs::write(path, content)
        .map_err(|e| ProfileError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}
