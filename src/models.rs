// src/models.rs

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

// --- ALIAS MODELS ---
// These are stored in the registry document (`aliases.json`).

lazy_static! {
    // Alias names become file names in the scripts folder: one path component, never `.` or `..`.
    static ref ALIAS_NAME_RE: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap();
}

/// Whether `name` may be used as an alias name.
pub fn is_valid_alias_name(name: &str) -> bool {
    ALIAS_NAME_RE.is_match(name)
}

/// Where an aliased command runs relative to the caller's working directory.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WorkingDirectory {
    /// Let the launcher pick its own working directory.
    #[default]
    Default,
    /// Map the caller's current directory into the target.
    Map,
}

impl fmt::Display for WorkingDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Map => f.write_str("map"),
        }
    }
}

/// A single alias as persisted in the registry.
///
/// `instance` and `command` together form the target the alias dispatches to. The registry
/// never interprets them. Attributes this version does not know about are kept in `extra`
/// so that a load/save cycle writes them back untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct AliasDefinition {
    pub name: String,
    pub instance: String,
    pub command: String,
    #[serde(default)]
    pub working_directory: WorkingDirectory,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AliasDefinition {
    /// Creates a definition with no extra attributes.
    pub fn new(
        name: impl Into<String>,
        instance: impl Into<String>,
        command: impl Into<String>,
        working_directory: WorkingDirectory,
    ) -> Self {
        Self {
            name: name.into(),
            instance: instance.into(),
            command: command.into(),
            working_directory,
            extra: BTreeMap::new(),
        }
    }
}

// --- INSTANCE RECORD MODELS ---

/// An additional network interface attached to an instance record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub id: String,
    pub mac_address: String,
    pub auto_mode: bool,
}

// --- PROCESS RESULT ---

/// Process exit codes reported by the `aliasctl` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    /// The command completed. Script warnings do not change this.
    Ok,
    /// Invalid invocation: bad flags, conflicting arguments, or unknown alias names.
    CommandLineError,
    /// The command was valid but could not be carried out (I/O, corrupt registry...).
    CommandFail,
}

impl ReturnCode {
    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::CommandLineError => 1,
            Self::CommandFail => 2,
        }
    }
}
