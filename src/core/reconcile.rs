//! # Registry / Script Reconciliation
//!
//! The registry and the scripts folder are allowed to drift apart: script failures during
//! removal are only warnings, and a crash can leave orphans behind. This module finds the
//! drift and, on request, regenerates missing scripts and deletes orphans.

use std::collections::BTreeSet;

use crate::{
    core::alias_registry::AliasRegistry,
    system::scripts::{ScriptAction, ScriptError, ScriptStore, ScriptWarning},
};

/// Differences between the registry and the scripts folder.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Registered aliases without a script.
    pub missing: Vec<String>,
    /// Scripts without a registered alias.
    pub orphans: Vec<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.orphans.is_empty()
    }
}

/// Compares the registry with the scripts present on disk. Both lists come back sorted.
pub fn scan(registry: &AliasRegistry, scripts: &dyn ScriptStore) -> Result<SyncReport, ScriptError> {
    let on_disk: BTreeSet<String> = scripts.list_scripts()?.into_iter().collect();

    let missing = registry
        .names()
        .filter(|name| !on_disk.contains(*name))
        .map(str::to_string)
        .collect();
    let orphans = on_disk
        .iter()
        .filter(|name| !registry.exists_alias(name))
        .cloned()
        .collect();

    Ok(SyncReport { missing, orphans })
}

/// Writes the missing scripts and removes the orphans listed in `report`.
///
/// Every entry is attempted; failures come back as warnings.
pub fn apply(
    registry: &AliasRegistry,
    scripts: &dyn ScriptStore,
    report: &SyncReport,
) -> Vec<ScriptWarning> {
    let mut warnings = Vec::new();

    for name in &report.missing {
        let Some(definition) = registry.get_alias(name) else {
            continue;
        };
        if let Err(e) = scripts.write_script(definition) {
            log::warn!("Could not regenerate script for alias '{}': {}", name, e);
            warnings.push(ScriptWarning::new(Some(name), ScriptAction::Write, &e));
        }
    }

    for name in &report.orphans {
        if let Err(e) = scripts.remove_script(name) {
            log::warn!("Could not remove orphan script '{}': {}", name, e);
            warnings.push(ScriptWarning::new(Some(name), ScriptAction::Remove, &e));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::ShellFlavor;
    use crate::core::unalias::tests::FakeScripts;
    use crate::models::{AliasDefinition, WorkingDirectory};
    use crate::system::scripts::ShimScripts;
    use std::fs;
    use tempfile::TempDir;

    fn registry_with(names: &[&str]) -> AliasRegistry {
        let mut registry = AliasRegistry::new();
        for name in names {
            registry
                .add_alias(AliasDefinition::new(
                    *name,
                    "primary",
                    "true",
                    WorkingDirectory::Default,
                ))
                .unwrap();
        }
        registry
    }

    #[test]
    fn test_scan_finds_missing_and_orphans() {
        let registry = registry_with(&["a", "b", "c"]);
        let scripts = FakeScripts::with_scripts(&["b", "x", "y"]);

        let report = scan(&registry, &scripts).unwrap();

        assert_eq!(report.missing, vec!["a", "c"]);
        assert_eq!(report.orphans, vec!["x", "y"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_apply_fixes_everything_it_can() {
        let registry = registry_with(&["a", "b"]);
        let scripts = FakeScripts {
            failing: ["b".to_string(), "y".to_string()].into_iter().collect(),
            ..FakeScripts::with_scripts(&["x", "y"])
        };
        let report = scan(&registry, &scripts).unwrap();

        let warnings = apply(&registry, &scripts, &report);

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].action, ScriptAction::Write);
        assert_eq!(warnings[0].alias.as_deref(), Some("b"));
        assert_eq!(warnings[1].action, ScriptAction::Remove);
        assert_eq!(warnings[1].alias.as_deref(), Some("y"));
        assert_eq!(
            scripts.list_scripts().unwrap(),
            vec!["a".to_string(), "y".to_string()]
        );
    }

    #[test]
    fn test_round_trip_on_disk_ends_clean() {
        let dir = TempDir::new().unwrap();
        let scripts = ShimScripts::new(dir.path().join("bin"), ShellFlavor::Posix, "multipass");
        let registry = registry_with(&["a", "b"]);
        fs::create_dir_all(scripts.folder()).unwrap();
        fs::write(scripts.folder().join("stale"), "#!/bin/sh\n").unwrap();

        let report = scan(&registry, &scripts).unwrap();
        assert_eq!(report.missing, vec!["a", "b"]);
        assert_eq!(report.orphans, vec!["stale"]);

        assert!(apply(&registry, &scripts, &report).is_empty());
        assert!(scan(&registry, &scripts).unwrap().is_clean());
    }
}
