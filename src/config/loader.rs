// src/config/loader.rs

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Like [`load_from_path`], but a missing file yields `Ok(None)`.
///
/// Used for the default config path, which is allowed to be absent when the
/// run command is given on the command line.
pub fn load_if_present(path: impl AsRef<Path>) -> Result<Option<RawConfigFile>> {
    match load_from_path(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(crate::errors::HotlapError::IoError(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks commands, the scan interval and exclude patterns.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `Hotlap.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Hotlap.toml")
}
