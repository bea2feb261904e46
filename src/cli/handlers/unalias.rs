//! # Handler for the `unalias` command
//!
//! Removes aliases by name, or all of them with `--all`. The argument combination is
//! validated here, before the registry is touched; the removal itself lives in
//! `core::unalias`. Script failures are reported as warnings and the command still succeeds.

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{
    cli::{UsageError, handlers::commons},
    core::unalias,
    state::AppContext,
};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Remove aliases and their scripts.")]
struct UnaliasArgs {
    /// Names of the aliases to remove.
    names: Vec<String>,

    /// Remove every alias and the whole scripts folder.
    #[arg(long)]
    all: bool,
}

/// The main handler for the `unalias` command.
pub fn handle(args: Vec<String>, context: &mut AppContext) -> Result<()> {
    let unalias_args = UnaliasArgs::try_parse_from(&args)?;
    run(&unalias_args.names, unalias_args.all, context)
}

/// Shared by `unalias` and `alias remove`.
pub(crate) fn run(names: &[String], all: bool, context: &mut AppContext) -> Result<()> {
    match (names.is_empty(), all) {
        (false, true) => return Err(UsageError::new(t!("unalias.error.name_and_all")).into()),
        (true, false) => return Err(UsageError::new(t!("unalias.error.name_required")).into()),
        _ => {}
    }

    let (registry, stores) = context.split();
    let report = if all {
        unalias::remove_all(registry, stores)?
    } else {
        unalias::remove_named(registry, stores, names)?
    };
    log::info!("Removed aliases: {:?}", report.removed);

    commons::print_warnings(&report.warnings);
    if all && report.removed.is_empty() {
        println!("{}", t!("unalias.info.nothing_to_remove"));
    } else {
        println!(
            "{} {}",
            t!("common.success").green(),
            format!(
                t!("unalias.success.removed"),
                count = commons::count_aliases(report.removed.len())
            )
        );
    }
    Ok(())
}
