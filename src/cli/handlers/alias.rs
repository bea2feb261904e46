//! # Handler for the `alias` command
//!
//! Creates, lists, removes and checks aliases. The top-level `aliases` command is routed to
//! the same listing code.
//!
//! ## Core Logic
//!
//! - **Subcommand Dispatch**: `handle` parses the arguments into subcommands (`set`, `list`,
//!   `remove`, `check`) and defaults to `list` when none is given.
//! - **Order of effects**: `set` saves the registry before writing the shim, so a failed
//!   shim write leaves a registered alias without a script. That is reported as a warning
//!   and `repair --fix` regenerates the script later.
//! - **Read-only views**: `list` and `check` never write anything.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::console::measure_text_width;

use crate::{
    cli::{UsageError, handlers::commons, handlers::unalias},
    core::{alias_registry::AliasRegistry, alias_registry::RegistryError, codec, reconcile},
    models::{self, AliasDefinition, WorkingDirectory},
    state::AppContext,
    system::scripts::{ScriptAction, ScriptStore, ScriptWarning},
};

// --- Command Argument Parsing ---

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Manage command aliases.")]
struct AliasArgs {
    #[command(subcommand)]
    command: Option<AliasCommand>,
}

#[derive(Subcommand, Debug)]
enum AliasCommand {
    /// Creates an alias and writes its script.
    Set {
        /// The name for the alias (e.g., 'lsp').
        name: String,
        /// The instance the command runs in (e.g., 'primary').
        instance: String,
        /// The command to run, with any fixed arguments.
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
        /// Whether the caller's working directory is mapped into the instance.
        #[arg(long, value_enum, default_value_t = WorkingDirectory::Default)]
        working_directory: WorkingDirectory,
        /// Replace an existing alias with the same name.
        #[arg(long, short)]
        force: bool,
    },
    /// Lists all defined aliases.
    #[command(name = "list", aliases = ["ls"])]
    List(ListArgs),
    /// Removes aliases.
    #[command(name = "remove", aliases = ["rm"])]
    Remove {
        /// The names of the aliases to remove.
        names: Vec<String>,
        /// Remove every alias.
        #[arg(long)]
        all: bool,
    },
    /// Verifies that every alias has its script.
    Check,
}

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "List all defined aliases.")]
struct AliasesArgs {
    #[command(flatten)]
    list: ListArgs,
}

#[derive(Args, Debug, Default)]
struct ListArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = ListFormat::Table)]
    format: ListFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ListFormat {
    #[default]
    Table,
    Json,
}

// --- Main Handlers ---

/// The main handler for the `alias` command.
pub fn handle(args: Vec<String>, context: &mut AppContext) -> Result<()> {
    let alias_args = AliasArgs::try_parse_from(&args)?;

    match alias_args
        .command
        .unwrap_or(AliasCommand::List(ListArgs::default()))
    {
        AliasCommand::Set {
            name,
            instance,
            command,
            working_directory,
            force,
        } => set_alias(
            &name,
            &instance,
            &command,
            working_directory,
            force,
            context,
        ),
        AliasCommand::List(list_args) => list_aliases(context.registry(), list_args.format),
        AliasCommand::Remove { names, all } => unalias::run(&names, all, context),
        AliasCommand::Check => check_aliases(context.registry(), context.scripts()),
    }
}

/// Handler for the top-level `aliases` command.
pub fn handle_list(args: Vec<String>, context: &mut AppContext) -> Result<()> {
    let aliases_args = AliasesArgs::try_parse_from(&args)?;
    list_aliases(context.registry(), aliases_args.list.format)
}

// --- Subcommand Logic ---

/// Registers the alias, saves the registry, then writes the shim.
fn set_alias(
    name: &str,
    instance: &str,
    command_words: &[String],
    working_directory: WorkingDirectory,
    force: bool,
    context: &mut AppContext,
) -> Result<()> {
    validate_alias_name(name)?;
    if instance.trim().is_empty() {
        return Err(UsageError::new(t!("alias.error.empty_instance")).into());
    }
    let command = join_command(command_words)?;

    let (registry, stores) = context.split();
    let is_update = registry.exists_alias(name);
    if is_update {
        if !force {
            return Err(RegistryError::DuplicateName {
                name: name.to_string(),
            }
            .into());
        }
        println!(
            "{}",
            format!(t!("alias.warning.overwriting"), name = name).yellow()
        );
        registry.remove_alias(name);
    }

    let definition = AliasDefinition::new(name, instance, command, working_directory);
    registry.add_alias(definition.clone())?;
    stores.save_registry(registry)?;
    log::info!("Alias '{}' saved to registry", name);

    if let Err(e) = stores.scripts.write_script(&definition) {
        log::warn!("Script write failed for alias '{}': {}", name, e);
        commons::print_warnings(&[ScriptWarning::new(Some(name), ScriptAction::Write, &e)]);
    }

    println!(
        "{} {} '{}' -> {} {}",
        t!("common.success").green(),
        if is_update {
            t!("alias.success.updated")
        } else {
            t!("alias.success.set")
        },
        name.cyan(),
        definition.instance,
        definition.command
    );
    Ok(())
}

/// Prints the aliases sorted by name, either as an aligned table or as the registry's JSON.
fn list_aliases(registry: &AliasRegistry, format: ListFormat) -> Result<()> {
    if format == ListFormat::Json {
        let aliases: Vec<AliasDefinition> = registry.iter().cloned().collect();
        print!("{}", codec::json_to_string(&codec::encode_alias_list(&aliases)));
        return Ok(());
    }

    if registry.is_empty() {
        println!("\n{}", t!("alias.info.no_aliases"));
        return Ok(());
    }

    println!("\n{}:", t!("alias.info.header"));

    let name_width = column_width(registry.iter().map(|a| a.name.as_str()));
    let instance_width = column_width(registry.iter().map(|a| a.instance.as_str()));

    for alias in registry.iter() {
        let name_padding = " ".repeat(name_width.saturating_sub(measure_text_width(&alias.name)));
        let instance_padding =
            " ".repeat(instance_width.saturating_sub(measure_text_width(&alias.instance)));
        let mapped = if alias.working_directory == WorkingDirectory::Map {
            format!("  {}", t!("alias.info.mapped").dimmed())
        } else {
            String::new()
        };
        println!(
            "  {}{}  {}{}  {}{}",
            alias.name.cyan(),
            name_padding,
            alias.instance,
            instance_padding,
            alias.command,
            mapped
        );
    }
    Ok(())
}

/// Reports, per alias, whether its script exists, then any scripts nobody owns.
fn check_aliases(registry: &AliasRegistry, scripts: &dyn ScriptStore) -> Result<()> {
    let report = reconcile::scan(registry, scripts)?;

    if registry.is_empty() && report.orphans.is_empty() {
        println!("\n{}", t!("alias.info.no_aliases"));
        return Ok(());
    }

    println!("\n{}", t!("alias.info.checking_header"));
    for name in registry.names() {
        if report.missing.iter().any(|m| m == name) {
            println!(
                "  {} {} -> {}",
                "✖".red(),
                name.cyan(),
                t!("alias.info.missing_script").red()
            );
        } else {
            println!(
                "  {} {} -> {}",
                "✔".green(),
                name.cyan(),
                scripts.script_path_for(name).display()
            );
        }
    }
    for orphan in &report.orphans {
        println!(
            "  {} {} -> {}",
            "✖".red(),
            orphan.yellow(),
            t!("alias.info.orphan_script").yellow()
        );
    }

    println!("---");
    if report.is_clean() {
        println!("{} {}", t!("common.success").green(), t!("alias.success.all_ok"));
    } else {
        println!(
            "{}",
            format!(
                t!("alias.warning.found_problems"),
                count = report.missing.len() + report.orphans.len()
            )
            .yellow()
        );
        println!("{}", t!("repair.info.how_to_fix").dimmed());
    }
    Ok(())
}

// --- Helper Functions ---

fn validate_alias_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(UsageError::new(t!("alias.error.empty_name")).into());
    }
    if !models::is_valid_alias_name(name) {
        return Err(UsageError::new(format!(t!("alias.error.invalid_name"), name = name)).into());
    }
    Ok(())
}

/// A single word is kept as typed, so `"ls -la"` stays a command line. Several words are
/// joined with shell quoting so that each one survives as a separate argument.
fn join_command(words: &[String]) -> Result<String> {
    match words {
        [single] if !single.trim().is_empty() => Ok(single.clone()),
        [_] | [] => Err(UsageError::new(t!("alias.error.empty_command")).into()),
        _ => shlex::try_join(words.iter().map(String::as_str))
            .map_err(|e| UsageError::new(e.to_string()).into()),
    }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.map(measure_text_width).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::return_code_for;
    use crate::core::document_store::MemoryDocumentStore;
    use crate::core::unalias::tests::FakeScripts;
    use crate::models::ReturnCode;
    use std::collections::BTreeSet;

    fn context(scripts: FakeScripts) -> AppContext {
        AppContext::new(
            "aliases.json",
            Box::new(MemoryDocumentStore::new()),
            Box::new(scripts),
        )
        .unwrap()
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_set_registers_saves_and_writes_script() {
        let mut context = context(FakeScripts::default());

        handle(
            args(&["set", "--working-directory", "map", "lsp", "primary", "ls", "-la"]),
            &mut context,
        )
        .unwrap();

        let alias = context.registry().get_alias("lsp").unwrap();
        assert_eq!(alias.instance, "primary");
        assert_eq!(alias.command, "ls -la");
        assert_eq!(alias.working_directory, WorkingDirectory::Map);
        let persisted = context.stores().load_registry().unwrap();
        assert!(persisted.exists_alias("lsp"));
        assert_eq!(context.scripts().list_scripts().unwrap(), vec!["lsp".to_string()]);
    }

    #[test]
    fn test_set_duplicate_requires_force() {
        let mut context = context(FakeScripts::default());
        handle(args(&["set", "a", "primary", "true"]), &mut context).unwrap();

        let err = handle(args(&["set", "a", "other", "false"]), &mut context).unwrap_err();
        assert_eq!(return_code_for(&err), ReturnCode::CommandFail);
        assert_eq!(context.registry().get_alias("a").unwrap().instance, "primary");

        handle(args(&["set", "--force", "a", "other", "false"]), &mut context).unwrap();
        assert_eq!(context.registry().get_alias("a").unwrap().instance, "other");
        assert_eq!(context.registry().len(), 1);
    }

    #[test]
    fn test_set_rejects_invalid_names_before_any_change() {
        let mut context = context(FakeScripts::default());

        for name in ["../up", "has space", ".hidden"] {
            let err = handle(args(&["set", name, "primary", "true"]), &mut context).unwrap_err();
            assert_eq!(return_code_for(&err), ReturnCode::CommandLineError);
        }
        assert!(context.registry().is_empty());
    }

    #[test]
    fn test_set_keeps_alias_when_script_write_fails() {
        let mut context = context(FakeScripts {
            failing: BTreeSet::from(["a".to_string()]),
            ..FakeScripts::default()
        });

        handle(args(&["set", "a", "primary", "true"]), &mut context).unwrap();

        assert!(context.stores().load_registry().unwrap().exists_alias("a"));
        assert!(context.scripts().list_scripts().unwrap().is_empty());
    }

    #[test]
    fn test_remove_subcommand_shares_unalias_rules() {
        let mut context = context(FakeScripts::default());
        handle(args(&["set", "a", "primary", "true"]), &mut context).unwrap();

        let err = handle(args(&["remove"]), &mut context).unwrap_err();
        assert_eq!(err.to_string(), "Name argument or --all is required");

        handle(args(&["rm", "a"]), &mut context).unwrap();
        assert!(context.registry().is_empty());
    }

    #[test]
    fn test_join_command() {
        assert_eq!(join_command(&args(&["ls -la"])).unwrap(), "ls -la");
        assert_eq!(
            join_command(&args(&["echo", "two words"])).unwrap(),
            "echo 'two words'"
        );
        assert!(join_command(&args(&["  "])).is_err());
    }

    #[test]
    fn test_list_and_check_are_read_only() {
        let mut context = context(FakeScripts::with_scripts(&["orphan"]));

        handle(Vec::new(), &mut context).unwrap();
        handle_list(args(&["--format", "json"]), &mut context).unwrap();
        handle(args(&["check"]), &mut context).unwrap();

        assert_eq!(
            context.scripts().list_scripts().unwrap(),
            vec!["orphan".to_string()]
        );
    }
}
