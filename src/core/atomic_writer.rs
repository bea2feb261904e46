//! # Atomic Writer
//!
//! Every file `aliasctl` owns is replaced through this module: the new content goes to a
//! temporary sibling of the destination, is flushed to disk, and is then renamed over the
//! destination. A rename within one filesystem is atomic, so any reader sees either the
//! previous complete file or the new complete file.
//!
//! The two phases are exposed separately ([`stage`] and [`StagedWrite::commit`]) so callers
//! can adjust the staged file (e.g. its permissions) before it becomes visible.

use log::{debug, trace};
use serde_json::Value;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::core::codec;

/// Errors raised while durably replacing a file.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Could not create directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not create a temporary file in '{path}': {source}")]
    TempFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write staged content for '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not replace '{path}': {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// New content that has been written and synced next to its destination but is not yet
/// visible there. Dropping it without calling [`commit`](Self::commit) deletes the
/// temporary file and leaves the destination as it was.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    destination: PathBuf,
}

impl StagedWrite {
    /// Path of the temporary file holding the staged content.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// The file this write will replace.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Renames the staged file over the destination.
    pub fn commit(self) -> Result<(), WriteError> {
        let Self { temp, destination } = self;
        // On failure `PersistError` hands the temp file back; dropping it removes it.
        temp.persist(&destination).map_err(|e| WriteError::Persist {
            path: destination.display().to_string(),
            source: e.error,
        })?;
        sync_parent_dir(&destination);
        debug!("Committed atomic write to '{}'", destination.display());
        Ok(())
    }
}

/// Writes `bytes` to a temporary sibling of `destination` and syncs it, creating any missing
/// parent directories first.
pub fn stage(destination: &Path, bytes: &[u8]) -> Result<StagedWrite, WriteError> {
    let parent = parent_dir(destination);
    fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
        path: parent.display().to_string(),
        source: e,
    })?;

    let mut temp = tempfile::Builder::new()
        .prefix(".aliasctl-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| WriteError::TempFile {
            path: parent.display().to_string(),
            source: e,
        })?;

    let write_err = |e| WriteError::Write {
        path: destination.display().to_string(),
        source: e,
    };
    temp.write_all(bytes).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    trace!(
        "Staged {} bytes for '{}' at '{}'",
        bytes.len(),
        destination.display(),
        temp.path().display()
    );

    Ok(StagedWrite {
        temp,
        destination: destination.to_path_buf(),
    })
}

/// Replaces `destination` with `bytes` in one atomic step.
pub fn write_atomic(destination: &Path, bytes: &[u8]) -> Result<(), WriteError> {
    stage(destination, bytes)?.commit()
}

/// Serializes `document` as pretty JSON and writes it atomically to `destination`.
pub fn write_document(document: &Value, destination: &Path) -> Result<(), WriteError> {
    write_atomic(destination, codec::json_to_string(document).as_bytes())
}

/// The directory a temporary file must live in to be renamed onto `path`.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Flushes the directory entry of a freshly renamed file. Failures only cost durability
/// across power loss, not atomicity, so they are logged and ignored.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Err(e) = fs::File::open(parent_dir(path)).and_then(|dir| dir.sync_all()) {
        debug!(
            "Could not sync directory of '{}' after rename: {}",
            path.display(),
            e
        );
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}
