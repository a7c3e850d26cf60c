// src/storage.rs
//! Persisted user settings (endpoint and contract address). Positions are never cached.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_address: Option<String>,
}

// Get the storage directory for the current platform
fn get_storage_dir() -> PathBuf {
    let home_dir = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home_dir).join(".hackerboost_staking")
}

pub fn get_settings_file_path() -> PathBuf {
    get_storage_dir().join("settings.json")
}

/// Load settings; a missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings, StorageError> {
    if !path.exists() {
        log::debug!("No settings file at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(path)?;
    let settings = serde_json::from_str(&contents)?;
    log::info!("Loaded settings from {}", path.display());
    Ok(settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let serialized = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, serialized)?;
    log::info!("Saved settings to {}", path.display());
    Ok(())
}

pub fn load_settings() -> Settings {
    let path = get_settings_file_path();
    match load_settings_from(&path) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Ignoring settings file {}: {}", path.display(), e);
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<(), StorageError> {
    save_settings_to(&get_settings_file_path(), settings)
}
