// src/state.rs

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::core::{
    alias_registry::{AliasRegistry, AliasStores, RegistryError},
    document_store::{DocumentStore, JsonFileStore},
    paths,
    settings::Settings,
};
use crate::system::scripts::{ScriptStore, ShimScripts};

/// Everything a command handler works with: the registry loaded for this run and the
/// collaborators used to persist it and to manage scripts.
///
/// There is no global instance; `main` builds one and passes it down, and tests build their
/// own around in-memory stores.
#[derive(Debug)]
pub struct AppContext {
    registry: AliasRegistry,
    registry_path: PathBuf,
    documents: Box<dyn DocumentStore>,
    scripts: Box<dyn ScriptStore>,
}

impl AppContext {
    /// Loads the registry at `registry_path` through `documents`.
    pub fn new(
        registry_path: impl Into<PathBuf>,
        documents: Box<dyn DocumentStore>,
        scripts: Box<dyn ScriptStore>,
    ) -> Result<Self, RegistryError> {
        let registry_path = registry_path.into();
        let registry = AliasRegistry::load(documents.as_ref(), &registry_path)?;
        Ok(Self {
            registry,
            registry_path,
            documents,
            scripts,
        })
    }

    /// Builds the production context: settings and registry from `config_dir`, JSON files
    /// written atomically, shims in the configured scripts folder.
    pub fn from_config_dir(config_dir: &Path) -> Result<Self> {
        let settings = Settings::load(config_dir)?;
        let scripts = ShimScripts::from_settings(&settings)?;
        log::debug!(
            "Config dir '{}', scripts folder '{}'",
            config_dir.display(),
            scripts.folder().display()
        );
        let registry_path = paths::registry_path(config_dir);
        Self::new(&registry_path, Box::new(JsonFileStore), Box::new(scripts)).with_context(
            || format!("Failed to load alias registry '{}'", registry_path.display()),
        )
    }

    /// Provides read-only access to the registry.
    pub fn registry(&self) -> &AliasRegistry {
        &self.registry
    }

    pub fn scripts(&self) -> &dyn ScriptStore {
        self.scripts.as_ref()
    }

    pub fn stores(&self) -> AliasStores<'_> {
        AliasStores {
            documents: self.documents.as_ref(),
            registry_path: &self.registry_path,
            scripts: self.scripts.as_ref(),
        }
    }

    /// Mutable access to the registry alongside the stores used to persist it.
    pub fn split(&mut self) -> (&mut AliasRegistry, AliasStores<'_>) {
        (
            &mut self.registry,
            AliasStores {
                documents: self.documents.as_ref(),
                registry_path: &self.registry_path,
                scripts: self.scripts.as_ref(),
            },
        )
    }
}
