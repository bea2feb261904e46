//! # Handler for the `repair` command
//!
//! Finds where the registry and the scripts folder disagree and, with `--fix`, brings the
//! folder back in line with the registry. The registry is the source of truth and is never
//! modified here.
//!
//! ## Core Logic
//!
//! 1.  **Scan & Detect**: `reconcile::scan` lists registered aliases without a script
//!     (left behind by a failed script write) and scripts without an alias (left behind by
//!     a failed removal or an interrupted `unalias`).
//! 2.  **Report**: both lists are printed, color-coded.
//! 3.  **Fix (Optional)**: with `--fix`, and after confirmation unless `--yes` is given,
//!     missing scripts are regenerated and orphans deleted. Entries that still fail are
//!     printed as warnings.

use anyhow::Result;
use clap::Parser;
use colored::*;
use dialoguer::{Confirm, theme::ColorfulTheme};

use crate::{cli::handlers::commons, core::reconcile, state::AppContext};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Finds and fixes differences between the alias registry and the scripts folder."
)]
struct RepairArgs {
    /// Regenerate missing scripts and delete orphan scripts.
    #[arg(long)]
    fix: bool,

    /// Do not ask for confirmation. Requires --fix.
    #[arg(long, short, requires = "fix")]
    yes: bool,
}

/// The main handler for the `repair` command.
pub fn handle(args: Vec<String>, context: &mut AppContext) -> Result<()> {
    let repair_args = RepairArgs::try_parse_from(&args)?;
    let registry = context.registry();
    let scripts = context.scripts();

    // --- Phase 1: Scan and Detect ---
    let report = reconcile::scan(registry, scripts)?;
    log::debug!("Reconciliation report: {:?}", report);

    // --- Phase 2: Report and (Optionally) Fix ---
    if report.is_clean() {
        println!("{}", t!("repair.success.no_issues").green());
        return Ok(());
    }

    println!(
        "\n{}",
        format!(
            t!("repair.warning.found_issues"),
            count = report.missing.len() + report.orphans.len()
        )
        .yellow()
    );
    for name in &report.missing {
        println!(
            "  - {} {}",
            name.cyan(),
            t!("alias.info.missing_script").red()
        );
    }
    for name in &report.orphans {
        println!(
            "  - {} {}",
            scripts.script_path_for(name).display(),
            t!("alias.info.orphan_script").yellow()
        );
    }

    if !repair_args.fix {
        println!("\n{}", t!("repair.info.how_to_fix").dimmed());
        return Ok(());
    }

    if !repair_args.yes
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("repair.prompt.apply_fixes"))
            .default(true)
            .interact()?
    {
        println!("\n{}", t!("common.info.operation_cancelled"));
        return Ok(());
    }

    // --- Phase 3: Apply Fixes ---
    let warnings = reconcile::apply(registry, scripts, &report);
    commons::print_warnings(&warnings);

    let fixed_count = (report.missing.len() + report.orphans.len()).saturating_sub(warnings.len());
    println!(
        "\n{}",
        format!(t!("repair.success.fixed"), count = fixed_count).green()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::return_code_for;
    use crate::core::document_store::MemoryDocumentStore;
    use crate::core::unalias::tests::FakeScripts;
    use crate::models::ReturnCode;
    use serde_json::json;

    fn context_with(aliases: &[&str], scripts: &[&str]) -> AppContext {
        let documents = MemoryDocumentStore::new();
        let aliases: Vec<_> = aliases
            .iter()
            .map(|n| json!({"name": n, "instance": "primary", "command": "true"}))
            .collect();
        documents.insert("aliases.json", json!({ "aliases": aliases }));
        AppContext::new(
            "aliases.json",
            Box::new(documents),
            Box::new(FakeScripts::with_scripts(scripts)),
        )
        .unwrap()
    }

    fn listed(context: &AppContext) -> Vec<String> {
        context.scripts().list_scripts().unwrap()
    }

    #[test]
    fn test_report_only_changes_nothing() {
        let mut context = context_with(&["a", "b"], &["b", "stale"]);

        handle(Vec::new(), &mut context).unwrap();

        assert_eq!(listed(&context), vec!["b".to_string(), "stale".to_string()]);
    }

    #[test]
    fn test_fix_with_yes_reconciles_without_prompting() {
        let mut context = context_with(&["a", "b"], &["b", "stale"]);

        handle(vec!["--fix".to_string(), "--yes".to_string()], &mut context).unwrap();

        assert_eq!(listed(&context), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(context.registry().len(), 2);
    }

    #[test]
    fn test_yes_requires_fix() {
        let mut context = context_with(&[], &[]);

        let err = handle(vec!["--yes".to_string()], &mut context).unwrap_err();

        assert_eq!(return_code_for(&err), ReturnCode::CommandLineError);
    }
}
