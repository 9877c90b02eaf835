//! IO helpers for reading the config file from disk.

use crate::{CadreConfig, ConfigError};
use directories::UserDirs;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename under the config directory.
const DEFAULT_CONFIG_FILE: &str = "cadre.json5";
/// Default config directory under the user home.
const DEFAULT_CONFIG_DIR: &str = ".cadre";

/// Default user config path under the home directory.
pub fn default_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}

/// Load configuration from an explicit path or the default location.
///
/// An explicit path must exist; the default path is optional and falls back
/// to built-in defaults when missing.
pub fn load_config(path: Option<&Path>) -> Result<CadreConfig, ConfigError> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        return read_config_file(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => read_config_file(&path),
        _ => {
            debug!("no config file found, using defaults");
            Ok(CadreConfig::default())
        }
    }
}

/// Read and parse a single config file.
fn read_config_file(path: &Path) -> Result<CadreConfig, ConfigError> {
    info!("loading config (path={})", path.display());
    let contents = fs::read_to_string(path)?;
    let config: CadreConfig = json5::from_str(&contents)?;
    Ok(config)
}
