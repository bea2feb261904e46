//! # Document Store
//!
//! The persistence seam used by the alias registry. [`JsonFileStore`] is the real thing: it
//! reads JSON files and writes them through the atomic writer. [`MemoryDocumentStore`] keeps
//! documents in memory and can be told to refuse writes, which lets workflows be tested
//! against persistence failures without touching the disk.

use serde_json::Value;
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    fmt::Debug,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::core::atomic_writer::{self, WriteError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("Writes to '{path}' are currently refused.")]
    Rejected { path: String },
}

/// Loads and saves whole JSON documents by path.
pub trait DocumentStore: Debug {
    /// Returns `Ok(None)` when no document exists at `path`.
    fn read(&self, path: &Path) -> Result<Option<Value>, StoreError>;

    /// Replaces the document at `path`. Readers must never observe a partial document.
    fn write(&self, document: &Value, path: &Path) -> Result<(), StoreError>;
}

/// JSON files on disk, replaced atomically.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileStore;

impl DocumentStore for JsonFileStore {
    fn read(&self, path: &Path) -> Result<Option<Value>, StoreError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No document at '{}'", path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(StoreError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Parse {
                path: path.display().to_string(),
                source: e,
            })
    }

    fn write(&self, document: &Value, path: &Path) -> Result<(), StoreError> {
        atomic_writer::write_document(document, path)?;
        Ok(())
    }
}

/// An in-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RefCell<BTreeMap<PathBuf, Value>>,
    refuse_writes: Cell<bool>,
    write_count: Cell<usize>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a document.
    pub fn insert(&self, path: impl Into<PathBuf>, document: Value) {
        self.documents.borrow_mut().insert(path.into(), document);
    }

    /// Returns a copy of the document stored at `path`.
    pub fn get(&self, path: &Path) -> Option<Value> {
        self.documents.borrow().get(path).cloned()
    }

    /// Makes every subsequent write fail with [`StoreError::Rejected`].
    pub fn refuse_writes(&self, refuse: bool) {
        self.refuse_writes.set(refuse);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.write_count.get()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, path: &Path) -> Result<Option<Value>, StoreError> {
        Ok(self.get(path))
    }

    fn write(&self, document: &Value, path: &Path) -> Result<(), StoreError> {
        if self.refuse_writes.get() {
            return Err(StoreError::Rejected {
                path: path.display().to_string(),
            });
        }
        self.insert(path, document.clone());
        self.write_count.set(self.write_count.get() + 1);
        Ok(())
    }
}
