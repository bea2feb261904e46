//! # User Settings
//!
//! Loads `settings.toml` from the config directory. Every field is optional; a missing file
//! is the same as an empty one.
//!
//! ```toml
//! scripts_folder = "~/.local/share/aliasctl/bin"
//! shell = "posix"        # or "cmd"
//! launcher = "multipass"
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, io::ErrorKind, path::Path, path::PathBuf};
use thiserror::Error;

use crate::constants::DEFAULT_LAUNCHER;
use crate::core::paths::{self, PathError};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse settings file '{path}': {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Path error: {0}")]
    Path(#[from] PathError),
}

/// The kind of shim script to generate.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShellFlavor {
    /// `#!/bin/sh` scripts with no extension.
    Posix,
    /// `.bat` files for `cmd.exe`.
    Cmd,
}

impl Default for ShellFlavor {
    fn default() -> Self {
        if cfg!(target_os = "windows") {
            Self::Cmd
        } else {
            Self::Posix
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Folder for generated shims. `~` and environment variables are expanded.
    pub scripts_folder: Option<String>,
    pub shell: ShellFlavor,
    /// Program every shim hands control to.
    pub launcher: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scripts_folder: None,
            shell: ShellFlavor::default(),
            launcher: DEFAULT_LAUNCHER.to_string(),
        }
    }
}

impl Settings {
    /// Reads `settings.toml` from `config_dir`, falling back to defaults if it is absent.
    pub fn load(config_dir: &Path) -> Result<Self, SettingsError> {
        let path = paths::settings_path(config_dir);
        match fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| SettingsError::TomlParse {
                path: path.display().to_string(),
                source: e,
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No settings at '{}', using defaults.", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(SettingsError::Read {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// The folder that holds one shim per alias.
    pub fn alias_scripts_folder(&self) -> Result<PathBuf, SettingsError> {
        let folder = match &self.scripts_folder {
            Some(template) => paths::expand_path_template(template)?,
            None => paths::default_alias_scripts_folder()?,
        };
        Ok(folder)
    }
}
