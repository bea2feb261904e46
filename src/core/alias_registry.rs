//! # Alias Registry
//!
//! The authoritative set of aliases, keyed by name. The registry is loaded once per process
//! from a [`DocumentStore`], mutated in memory, and saved back by the caller after each
//! mutation. Top-level sections of the registry document that are not aliases are carried
//! along untouched.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::{
    constants::ALIASES_KEY,
    core::{
        codec::{self, SchemaError},
        document_store::{DocumentStore, StoreError},
    },
    models::AliasDefinition,
    system::scripts::ScriptStore,
};

/// Represents errors that can occur during operations on the [`AliasRegistry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    /// An alias with this name is already registered.
    #[error("Alias '{name}' already exists.")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
    /// The registry document exists but cannot be decoded.
    #[error("Malformed alias registry '{path}': {source}")]
    Schema {
        path: String,
        #[source]
        source: SchemaError,
    },
    /// The registry document could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

type RegistryResult<T> = Result<T, RegistryError>;

/// The aliases of one registry document, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasRegistry {
    aliases: BTreeMap<String, AliasDefinition>,
    other_sections: Map<String, Value>,
}

impl AliasRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an alias called `name` is registered.
    pub fn exists_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// The definition registered under `name`.
    pub fn get_alias(&self, name: &str) -> Option<&AliasDefinition> {
        self.aliases.get(name)
    }

    /// Registers a new alias.
    ///
    /// # Errors
    /// Returns `RegistryError::DuplicateName` if the name is already taken.
    pub fn add_alias(&mut self, definition: AliasDefinition) -> RegistryResult<()> {
        if self.exists_alias(&definition.name) {
            return Err(RegistryError::DuplicateName {
                name: definition.name,
            });
        }
        self.aliases.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Deletes an alias. Callers are expected to have checked [`exists_alias`](Self::exists_alias);
    /// removing an unknown name changes nothing and returns `None`.
    pub fn remove_alias(&mut self, name: &str) -> Option<AliasDefinition> {
        let removed = self.aliases.remove(name);
        if removed.is_none() {
            log::warn!("remove_alias called for unknown alias '{}'", name);
        }
        removed
    }

    /// Removes every alias. Other document sections are kept.
    pub fn clear(&mut self) {
        self.aliases.clear();
    }

    /// Number of registered aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Iterates over the aliases in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AliasDefinition> {
        self.aliases.values()
    }

    /// Alias names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aliases.keys().map(String::as_str)
    }

    /// Builds a registry from a persisted document.
    ///
    /// A document without an `aliases` key is an empty registry. Two entries with the same
    /// name are rejected rather than silently merged.
    pub fn from_document(document: &Value) -> Result<Self, SchemaError> {
        let mut root = document
            .as_object()
            .cloned()
            .ok_or_else(|| SchemaError::WrongType {
                key: "<root>".to_string(),
                expected: "an object",
            })?;

        let mut aliases = BTreeMap::new();
        if let Some(list) = root.remove(ALIASES_KEY) {
            for definition in codec::decode_alias_list(ALIASES_KEY, &list)? {
                if aliases.contains_key(&definition.name) {
                    return Err(SchemaError::DuplicateAlias {
                        name: definition.name,
                    });
                }
                aliases.insert(definition.name.clone(), definition);
            }
        }

        Ok(Self {
            aliases,
            other_sections: root,
        })
    }

    /// Encodes the registry; aliases are written sorted by name.
    pub fn to_document(&self) -> Value {
        let mut root = self.other_sections.clone();
        let list: Vec<AliasDefinition> = self.aliases.values().cloned().collect();
        root.insert(ALIASES_KEY.to_string(), codec::encode_alias_list(&list));
        Value::Object(root)
    }

    /// Loads the registry stored at `path`. A missing document yields an empty registry.
    pub fn load(store: &dyn DocumentStore, path: &Path) -> RegistryResult<Self> {
        let Some(document) = store.read(path)? else {
            log::debug!(
                "Alias registry '{}' does not exist yet, starting empty.",
                path.display()
            );
            return Ok(Self::new());
        };
        let registry = Self::from_document(&document).map_err(|e| RegistryError::Schema {
            path: path.display().to_string(),
            source: e,
        })?;
        log::debug!(
            "Loaded {} aliases from '{}'",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Persists the registry to `path`.
    pub fn save(&self, store: &dyn DocumentStore, path: &Path) -> RegistryResult<()> {
        store.write(&self.to_document(), path)?;
        log::debug!("Saved {} aliases to '{}'", self.len(), path.display());
        Ok(())
    }
}

/// The collaborators every alias workflow needs, passed in explicitly so tests can swap
/// any of them for in-memory doubles.
#[derive(Debug, Clone, Copy)]
pub struct AliasStores<'a> {
    pub documents: &'a dyn DocumentStore,
    pub registry_path: &'a Path,
    pub scripts: &'a dyn ScriptStore,
}

impl AliasStores<'_> {
    /// Loads the registry from the configured document.
    pub fn load_registry(&self) -> RegistryResult<AliasRegistry> {
        AliasRegistry::load(self.documents, self.registry_path)
    }

    /// Saves `registry` to the configured document.
    pub fn save_registry(&self, registry: &AliasRegistry) -> RegistryResult<()> {
        registry.save(self.documents, self.registry_path)
    }
}
