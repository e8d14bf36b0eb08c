// src/config/loader.rs

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{LintError, Result};
use crate::fs::FileSystem;

/// Read and deserialize a config file. No semantic validation.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path)?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Read, deserialize and validate a config file.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(fs, &path)?;
    ConfigFile::try_from(raw)
}

/// Resolve the config for a run.
///
/// An explicit path must exist. Without one, [`default_config_path`] is used
/// if present and the built-in defaults otherwise.
pub fn load_or_default(fs: &dyn FileSystem, explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        if !fs.is_file(path) {
            return Err(LintError::ConfigError(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return load_and_validate(fs, path);
    }

    let default = default_config_path();
    if fs.is_file(&default) {
        debug!(path = %default.display(), "using default config file");
        load_and_validate(fs, &default)
    } else {
        debug!("no config file found; using built-in defaults");
        Ok(ConfigFile::default())
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("Kubelint.toml")
}
