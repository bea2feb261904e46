//! # Alias Scripts
//!
//! Keeps one generated shim per alias in the alias scripts folder. [`ScriptStore`] is the
//! seam the workflows talk to; [`ShimScripts`] is the filesystem implementation.
//!
//! Scripts are a derived artifact of the registry, so callers are free to treat a
//! [`ScriptError`] as a warning rather than a failure.

use log::debug;
use std::{
    fmt::{self, Debug},
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

use crate::{
    core::{
        atomic_writer::{self, WriteError},
        settings::{Settings, SettingsError, ShellFlavor},
    },
    models::{self, AliasDefinition},
    system::shim,
};

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("'{name}' is not a valid alias name; refusing to touch a path outside the scripts folder")]
    InvalidName { name: String },
    #[error("Could not render script for alias '{name}': {reason}")]
    Render { name: String, reason: String },
    #[error("Could not write script '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: WriteError,
    },
    #[error("Could not make script '{path}' executable: {source}")]
    Permissions {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not remove script '{path}': {source}")]
    Remove {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not remove scripts folder '{path}': {source}")]
    RemoveFolder {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not list scripts folder '{path}': {source}")]
    List {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}

/// What was being done to a script when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptAction {
    Write,
    Remove,
}

/// A script failure that was downgraded to a warning. The registry change that caused the
/// script operation stands; `repair` can bring the scripts back in line later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptWarning {
    /// The alias whose script failed, or `None` for the scripts folder as a whole.
    pub alias: Option<String>,
    pub action: ScriptAction,
    pub message: String,
}

impl ScriptWarning {
    pub fn new(alias: Option<&str>, action: ScriptAction, error: &ScriptError) -> Self {
        Self {
            alias: alias.map(str::to_string),
            action,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ScriptWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.action {
            ScriptAction::Write => "writing",
            ScriptAction::Remove => "removing",
        };
        match &self.alias {
            Some(name) => write!(
                f,
                "'{}' when {} alias script for {}",
                self.message, verb, name
            ),
            None => write!(f, "'{}' when {} the alias scripts folder", self.message, verb),
        }
    }
}

/// Generates and deletes the per-alias shim scripts.
pub trait ScriptStore: Debug {
    /// Where the script for `name` lives. Pure; does not touch the filesystem or validate
    /// `name`. Operations that write or delete refuse invalid names.
    fn script_path_for(&self, name: &str) -> PathBuf;

    /// Creates or overwrites the script for `definition`.
    fn write_script(&self, definition: &AliasDefinition) -> Result<PathBuf, ScriptError>;

    /// Deletes the script for `name`. Deleting a script that does not exist succeeds.
    fn remove_script(&self, name: &str) -> Result<(), ScriptError>;

    /// Deletes the whole scripts folder. A folder that does not exist is not an error.
    fn remove_all_scripts(&self) -> Result<(), ScriptError>;

    /// Names of the aliases that currently have a script, sorted.
    fn list_scripts(&self) -> Result<Vec<String>, ScriptError>;
}

#[derive(Debug, Clone)]
pub struct ShimScripts {
    folder: PathBuf,
    flavor: ShellFlavor,
    launcher: String,
}

impl ShimScripts {
    pub fn new(folder: impl Into<PathBuf>, flavor: ShellFlavor, launcher: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            flavor,
            launcher: launcher.into(),
        }
    }

    /// Builds the store described by the user's settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, SettingsError> {
        Ok(Self::new(
            settings.alias_scripts_folder()?,
            settings.shell,
            settings.launcher.clone(),
        ))
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    fn extension(&self) -> Option<&'static str> {
        match self.flavor {
            ShellFlavor::Posix => None,
            ShellFlavor::Cmd => Some("bat"),
        }
    }

    /// The script path for `name`, provided `name` cannot point outside the folder.
    fn checked_script_path(&self, name: &str) -> Result<PathBuf, ScriptError> {
        if !models::is_valid_alias_name(name) {
            return Err(ScriptError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.script_path_for(name))
    }

    /// Maps a file name found in the folder back to an alias name.
    fn alias_name_of(&self, file_name: &str) -> Option<String> {
        // Hidden files include the atomic writer's temporaries.
        if file_name.starts_with('.') {
            return None;
        }
        match self.extension() {
            None => Some(file_name.to_string()),
            Some(ext) => file_name
                .strip_suffix(ext)
                .and_then(|stem| stem.strip_suffix('.'))
                .filter(|stem| !stem.is_empty())
                .map(str::to_string),
        }
    }
}

impl ScriptStore for ShimScripts {
    fn script_path_for(&self, name: &str) -> PathBuf {
        match self.extension() {
            None => self.folder.join(name),
            Some(ext) => self.folder.join(format!("{}.{}", name, ext)),
        }
    }

    fn write_script(&self, definition: &AliasDefinition) -> Result<PathBuf, ScriptError> {
        let path = self.checked_script_path(&definition.name)?;
        let content = shim::render(definition, &self.launcher, self.flavor).map_err(|e| {
            ScriptError::Render {
                name: definition.name.clone(),
                reason: e.to_string(),
            }
        })?;

        let staged = atomic_writer::stage(&path, content.as_bytes()).map_err(|e| {
            ScriptError::Write {
                path: path.display().to_string(),
                source: e,
            }
        })?;
        make_executable(staged.temp_path()).map_err(|e| ScriptError::Permissions {
            path: path.display().to_string(),
            source: e,
        })?;
        staged.commit().map_err(|e| ScriptError::Write {
            path: path.display().to_string(),
            source: e,
        })?;

        debug!("Wrote alias script '{}'", path.display());
        Ok(path)
    }

    fn remove_script(&self, name: &str) -> Result<(), ScriptError> {
        let path = self.checked_script_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed alias script '{}'", path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Alias script '{}' was already gone", path.display());
                Ok(())
            }
            Err(e) => Err(ScriptError::Remove {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    fn remove_all_scripts(&self) -> Result<(), ScriptError> {
        match fs::remove_dir_all(&self.folder) {
            Ok(()) => {
                debug!("Removed scripts folder '{}'", self.folder.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScriptError::RemoveFolder {
                path: self.folder.display().to_string(),
                source: e,
            }),
        }
    }

    fn list_scripts(&self) -> Result<Vec<String>, ScriptError> {
        if !self.folder.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.folder).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| ScriptError::List {
                path: self.folder.display().to_string(),
                source: e,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(name) = self.alias_name_of(&entry.file_name().to_string_lossy()) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
