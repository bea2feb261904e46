// src/core/paths.rs

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants::{
    APP_DIR_NAME, CONFIG_DIR_ENV, REGISTRY_FILENAME, SCRIPTS_DIR_NAME, SETTINGS_FILENAME,
};

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not find system local data directory.")]
    DataDirNotFound,
    #[error("Failed to expand path template '{template}': {reason}")]
    Expand { template: String, reason: String },
}

/// Returns the aliasctl configuration directory.
///
/// `$ALIASCTL_CONFIG_DIR` wins when set and non-empty; otherwise this is
/// `<system config dir>/aliasctl` (e.g. `~/.config/aliasctl`). The directory is not created
/// here: the atomic writer creates it on the first save.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    if let Some(dir) = env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(PathError::ConfigDirNotFound)
}

/// Path of the alias registry document inside `config_dir`.
pub fn registry_path(config_dir: &Path) -> PathBuf {
    config_dir.join(REGISTRY_FILENAME)
}

/// Path of `settings.toml` inside `config_dir`.
pub fn settings_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILENAME)
}

/// The folder shims go to when settings do not name one: `<local data dir>/aliasctl/bin`.
pub fn default_alias_scripts_folder() -> Result<PathBuf, PathError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(SCRIPTS_DIR_NAME))
        .ok_or(PathError::DataDirNotFound)
}

/// Expands `~` and environment variables (`$VAR`, `${VAR}`) in a user supplied path.
///
/// # Errors
/// Returns `PathError::Expand` when the template references an undefined variable.
pub fn expand_path_template(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expand {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}
