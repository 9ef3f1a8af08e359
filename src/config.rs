//! Per-database settings file, `<db>.config.json`, written by `init`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::time::BusinessClock;
use crate::error::ShiftopsError;

pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// IANA name of the business timezone.
    pub timezone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

impl AppConfig {
    pub fn clock(&self) -> Result<BusinessClock, ShiftopsError> {
        BusinessClock::from_name(&self.timezone)
    }
}

pub fn config_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(".config.json");
    PathBuf::from(name)
}

/// Read the config beside `db_path`. A database created without one runs in UTC.
pub fn load(db_path: &Path) -> Result<AppConfig, ShiftopsError> {
    let path = config_path(db_path);
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(&path)
        .map_err(|e| ShiftopsError::database(format!("Cannot read {}: {e}", path.display())))?;
    let config: AppConfig = serde_json::from_str(&content)?;
    config.clock()?;
    Ok(config)
}

pub fn write(db_path: &Path, config: &AppConfig) -> Result<PathBuf, ShiftopsError> {
    config.clock()?;
    let path = config_path(db_path);
    fs::write(&path, serde_json::to_string_pretty(config)?)
        .map_err(|e| ShiftopsError::database(format!("Cannot write {}: {e}", path.display())))?;
    Ok(path)
}
