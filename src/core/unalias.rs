//! # Alias Removal
//!
//! Removes aliases from the registry and their shims from the scripts folder.
//!
//! ## Named removal
//!
//! Every requested name is checked first. If any is unknown, nothing is removed and the
//! error lists all unknown names at once. Otherwise each alias is removed from the registry,
//! the registry is saved, and only then is the alias's script deleted. A crash between the
//! save and the script deletion leaves an orphan script behind and nothing worse. Script
//! failures are collected as warnings and never undo the registry change.
//!
//! ## Removing everything
//!
//! The registry is cleared and saved before the scripts folder is deleted, so an
//! interruption can only leave orphan scripts, which a later `unalias --all` or
//! `repair --fix` cleans up.

use thiserror::Error;

use crate::{
    core::alias_registry::{AliasRegistry, AliasStores, RegistryError},
    system::scripts::{ScriptAction, ScriptWarning},
};

#[derive(Error, Debug)]
pub enum UnaliasError {
    /// One or more requested aliases are not registered. Nothing was removed.
    #[error("{}", unknown_aliases_message(.0))]
    UnknownAliases(Vec<String>),
    /// The registry could not be persisted.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The outcome of a removal that went through.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovalReport {
    /// Names removed from the registry, in processing order.
    pub removed: Vec<String>,
    /// Script failures that were tolerated.
    pub warnings: Vec<ScriptWarning>,
}

/// `Unexisting alias: a.` for one name, `Unexisting aliases: a, b.` for several.
pub fn unknown_aliases_message(names: &[String]) -> String {
    match names {
        [single] => format!("Unexisting alias: {}.", single),
        _ => format!("Unexisting aliases: {}.", names.join(", ")),
    }
}

/// Removes the named aliases and their scripts.
///
/// Names repeated in `names` are processed once.
///
/// # Errors
/// - `UnaliasError::UnknownAliases` when any name is not registered; the registry, the
///   persisted document and the scripts are all left untouched.
/// - `UnaliasError::Registry` when saving fails. Aliases processed before the failure stay
///   removed on disk; the failing one is removed in memory only.
pub fn remove_named(
    registry: &mut AliasRegistry,
    stores: AliasStores<'_>,
    names: &[String],
) -> Result<RemovalReport, UnaliasError> {
    let mut requested: Vec<&str> = Vec::with_capacity(names.len());
    for name in names {
        if !requested.contains(&name.as_str()) {
            requested.push(name);
        }
    }

    let unknown: Vec<String> = requested
        .iter()
        .filter(|name| !registry.exists_alias(name))
        .map(|name| name.to_string())
        .collect();
    if !unknown.is_empty() {
        log::debug!("Refusing removal, unknown aliases: {:?}", unknown);
        return Err(UnaliasError::UnknownAliases(unknown));
    }

    let mut report = RemovalReport::default();
    for name in requested {
        // Existence was checked above.
        registry.remove_alias(name);
        stores.save_registry(registry)?;
        report.removed.push(name.to_string());

        if let Err(e) = stores.scripts.remove_script(name) {
            log::warn!("Script removal failed for alias '{}': {}", name, e);
            report
                .warnings
                .push(ScriptWarning::new(Some(name), ScriptAction::Remove, &e));
        }
    }

    Ok(report)
}

/// Removes every alias and the whole scripts folder. Safe to call on an empty registry.
///
/// # Errors
/// Returns `UnaliasError::Registry` if the emptied registry cannot be saved; the scripts
/// folder is not touched in that case.
pub fn remove_all(
    registry: &mut AliasRegistry,
    stores: AliasStores<'_>,
) -> Result<RemovalReport, UnaliasError> {
    let mut report = RemovalReport {
        removed: registry.names().map(str::to_string).collect(),
        warnings: Vec::new(),
    };

    registry.clear();
    stores.save_registry(registry)?;

    if let Err(e) = stores.scripts.remove_all_scripts() {
        log::warn!("Could not remove the alias scripts folder: {}", e);
        report
            .warnings
            .push(ScriptWarning::new(None, ScriptAction::Remove, &e));
    }

    Ok(report)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::document_store::{
        DocumentStore, JsonFileStore, MemoryDocumentStore, StoreError,
    };
    use crate::core::settings::ShellFlavor;
    use crate::models::{AliasDefinition, WorkingDirectory};
    use crate::system::scripts::{ScriptError, ScriptStore, ShimScripts};
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Script store double: keeps script names in memory and fails on demand.
    #[derive(Debug, Default)]
    pub(crate) struct FakeScripts {
        pub(crate) scripts: RefCell<BTreeSet<String>>,
        pub(crate) failing: BTreeSet<String>,
        pub(crate) fail_folder: bool,
    }

    impl FakeScripts {
        pub(crate) fn with_scripts(names: &[&str]) -> Self {
            Self {
                scripts: RefCell::new(names.iter().map(|n| n.to_string()).collect()),
                ..Self::default()
            }
        }

        fn io_error(name: &str) -> ScriptError {
            ScriptError::Remove {
                path: format!("/fake/{name}"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            }
        }
    }

    impl ScriptStore for FakeScripts {
        fn script_path_for(&self, name: &str) -> PathBuf {
            Path::new("/fake").join(name)
        }

        fn write_script(&self, definition: &AliasDefinition) -> Result<PathBuf, ScriptError> {
            if self.failing.contains(&definition.name) {
                return Err(Self::io_error(&definition.name));
            }
            self.scripts.borrow_mut().insert(definition.name.clone());
            Ok(self.script_path_for(&definition.name))
        }

        fn remove_script(&self, name: &str) -> Result<(), ScriptError> {
            if self.failing.contains(name) {
                return Err(Self::io_error(name));
            }
            self.scripts.borrow_mut().remove(name);
            Ok(())
        }

        fn remove_all_scripts(&self) -> Result<(), ScriptError> {
            if self.fail_folder {
                return Err(Self::io_error("*"));
            }
            self.scripts.borrow_mut().clear();
            Ok(())
        }

        fn list_scripts(&self) -> Result<Vec<String>, ScriptError> {
            Ok(self.scripts.borrow().iter().cloned().collect())
        }
    }

    const REGISTRY: &str = "aliases.json";

    fn alias(name: &str) -> AliasDefinition {
        AliasDefinition::new(name, "primary", "true", WorkingDirectory::Default)
    }

    fn registry_with(names: &[&str]) -> AliasRegistry {
        let mut registry = AliasRegistry::new();
        for name in names {
            registry.add_alias(alias(name)).unwrap();
        }
        registry
    }

    fn stores<'a>(documents: &'a dyn DocumentStore, scripts: &'a dyn ScriptStore) -> AliasStores<'a> {
        AliasStores {
            documents,
            registry_path: Path::new(REGISTRY),
            scripts,
        }
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_unknown_names_are_batched_and_nothing_changes() {
        let documents = MemoryDocumentStore::new();
        let scripts = FakeScripts::with_scripts(&["a"]);
        let mut registry = registry_with(&["a"]);
        let before = registry.clone();

        let err = remove_named(
            &mut registry,
            stores(&documents, &scripts),
            &strings(&["a", "ghost1", "ghost2"]),
        )
        .unwrap_err();

        assert!(
            matches!(err, UnaliasError::UnknownAliases(ref names) if *names == strings(&["ghost1", "ghost2"]))
        );
        assert_eq!(err.to_string(), "Unexisting aliases: ghost1, ghost2.");
        assert_eq!(registry, before);
        assert_eq!(documents.write_count(), 0);
        assert!(scripts.scripts.borrow().contains("a"));
    }

    #[test]
    fn test_single_unknown_name_uses_singular_message() {
        let documents = MemoryDocumentStore::new();
        let scripts = FakeScripts::default();
        let mut registry = registry_with(&["a"]);

        let err = remove_named(&mut registry, stores(&documents, &scripts), &strings(&["ghost"]))
            .unwrap_err();

        assert_eq!(err.to_string(), "Unexisting alias: ghost.");
        assert!(registry.exists_alias("a"));
    }

    #[test]
    fn test_script_failure_becomes_a_warning() {
        let documents = MemoryDocumentStore::new();
        let scripts = FakeScripts {
            failing: ["a".to_string()].into_iter().collect(),
            ..FakeScripts::with_scripts(&["a", "b"])
        };
        let mut registry = registry_with(&["a", "b", "c"]);

        let report =
            remove_named(&mut registry, stores(&documents, &scripts), &strings(&["a", "b"]))
                .unwrap();

        assert_eq!(report.removed, strings(&["a", "b"]));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].alias.as_deref(), Some("a"));
        assert!(report.warnings[0].to_string().contains("alias script for a"));
        assert!(!registry.exists_alias("a"));
        assert!(!registry.exists_alias("b"));
        assert!(registry.exists_alias("c"));

        let persisted = AliasRegistry::load(&documents, Path::new(REGISTRY)).unwrap();
        assert_eq!(persisted.names().collect::<Vec<_>>(), vec!["c"]);
        assert!(!scripts.scripts.borrow().contains("b"));
    }

    #[test]
    fn test_registry_is_saved_after_each_removal() {
        let documents = MemoryDocumentStore::new();
        let scripts = FakeScripts::default();
        let mut registry = registry_with(&["a", "b", "c"]);

        remove_named(
            &mut registry,
            stores(&documents, &scripts),
            &strings(&["c", "a", "c"]),
        )
        .unwrap();

        assert_eq!(documents.write_count(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_save_failure_is_not_swallowed() {
        let documents = MemoryDocumentStore::new();
        documents.refuse_writes(true);
        let scripts = FakeScripts::with_scripts(&["a"]);
        let mut registry = registry_with(&["a"]);

        let err = remove_named(&mut registry, stores(&documents, &scripts), &strings(&["a"]))
            .unwrap_err();

        assert!(matches!(
            err,
            UnaliasError::Registry(RegistryError::Store(StoreError::Rejected { .. }))
        ));
        // The script is only removed once the registry change is durable.
        assert!(scripts.scripts.borrow().contains("a"));
    }

    #[test]
    fn test_remove_all_reports_folder_failure_as_warning() {
        let documents = MemoryDocumentStore::new();
        let scripts = FakeScripts {
            fail_folder: true,
            ..FakeScripts::with_scripts(&["a"])
        };
        let mut registry = registry_with(&["a", "b"]);

        let report = remove_all(&mut registry, stores(&documents, &scripts)).unwrap();

        assert_eq!(report.removed, strings(&["a", "b"]));
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].alias, None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_named_removal_never_deletes_outside_the_scripts_folder() {
        let dir = TempDir::new().unwrap();
        let victim = dir.path().join("victim.txt");
        fs::write(&victim, "keep me").unwrap();
        let documents = MemoryDocumentStore::new();
        let scripts = ShimScripts::new(dir.path().join("bin"), ShellFlavor::Posix, "multipass");
        let mut registry = AliasRegistry::new();
        registry.add_alias(alias("../victim.txt")).unwrap();

        let report = remove_named(
            &mut registry,
            stores(&documents, &scripts),
            &strings(&["../victim.txt"]),
        )
        .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("not a valid alias name"));
        assert!(registry.is_empty());
        assert_eq!(fs::read_to_string(&victim).unwrap(), "keep me");
    }

    #[test]
    fn test_remove_all_is_idempotent_on_disk() {
        let dir = TempDir::new().unwrap();
        let registry_path = dir.path().join("config").join("aliases.json");
        let scripts = ShimScripts::new(dir.path().join("bin"), ShellFlavor::Posix, "multipass");
        let stores = AliasStores {
            documents: &JsonFileStore,
            registry_path: &registry_path,
            scripts: &scripts,
        };
        let mut registry = registry_with(&["a", "b"]);
        for definition in registry.iter() {
            scripts.write_script(definition).unwrap();
        }
        stores.save_registry(&registry).unwrap();

        for _ in 0..2 {
            let report = remove_all(&mut registry, stores).unwrap();
            assert!(report.warnings.is_empty());
            assert!(stores.load_registry().unwrap().is_empty());
            assert!(!scripts.folder().exists());
        }
    }
}
