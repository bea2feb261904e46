use anyhow::Result;
use clap::CommandFactory;

use crate::{
    cli::{Cli, UsageError, handlers},
    state::AppContext,
};

/// Defines a system command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut AppContext) -> Result<()>,
}

/// The single source of truth for all system commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "alias",
        aliases: &[],
        handler: handlers::alias::handle,
    },
    CommandDefinition {
        name: "aliases",
        aliases: &["ls"],
        handler: handlers::alias::handle_list,
    },
    CommandDefinition {
        name: "unalias",
        aliases: &[],
        handler: handlers::unalias::handle,
    },
    CommandDefinition {
        name: "repair",
        aliases: &["rep"],
        handler: handlers::repair::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `aliasctl <command> [args...]` to the command's handler.
pub fn dispatch(all_args: Vec<String>, context: &mut AppContext) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    let mut args = all_args.into_iter();
    let Some(command_name) = args.next() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let command = find_command(&command_name).ok_or_else(|| {
        UsageError::new(format!(t!("error.unknown_command"), command = command_name))
    })?;
    (command.handler)(args.collect(), context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_command_by_name_and_alias() {
        assert_eq!(find_command("unalias").map(|c| c.name), Some("unalias"));
        assert_eq!(find_command("ls").map(|c| c.name), Some("aliases"));
        assert!(find_command("unknown").is_none());
    }
}
