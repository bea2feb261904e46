use clap::Parser;
use thiserror::Error;

use crate::core::unalias::UnaliasError;
use crate::models::ReturnCode;

pub mod dispatcher;
pub mod handlers;

/// Builds the dynamic, color-aware full help string at runtime.
fn build_help_string() -> &'static str {
    // Replaces placeholders like `<title>` in the help template with terminal styles.
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();

    let template = t!("cli.help.template");

    let title = if use_colors { "\x1b[1;33m" } else { "" }; // Bold Yellow
    let cmd = if use_colors { "\x1b[36m" } else { "" }; // Cyan (for commands)
    let group = if use_colors { "\x1b[1;32m" } else { "" }; // Bold Green
    let err = if use_colors { "\x1b[91m" } else { "" }; // Bright Red (for destructive)
    let dim = if use_colors { "\x1b[2m" } else { "" }; // Dim
    let reset = if use_colors { "\x1b[0m" } else { "" };

    let formatted_string = template
        .replace("<title>", title)
        .replace("</title>", reset)
        .replace("<cmd>", cmd)
        .replace("</cmd>", reset)
        .replace("<group>", group)
        .replace("</group>", reset)
        .replace("<err>", err)
        .replace("</err>", reset)
        .replace("<dim>", dim)
        .replace("</dim>", reset);

    Box::leak(formatted_string.into_boxed_str())
}

/// aliasctl: keeps command aliases and their shim scripts in sync.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
#[command(trailing_var_arg = true)]
pub struct Cli {
    /// The command followed by its arguments. Each handler parses its own arguments.
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// The command line was well-formed for clap but asks for something contradictory or
/// incomplete. Reported before anything is changed.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct UsageError(pub String);

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Maps a failed command to the process exit code.
pub fn return_code_for(error: &anyhow::Error) -> ReturnCode {
    if error.downcast_ref::<UsageError>().is_some() || error.downcast_ref::<clap::Error>().is_some()
    {
        return ReturnCode::CommandLineError;
    }
    match error.downcast_ref::<UnaliasError>() {
        Some(UnaliasError::UnknownAliases(_)) => ReturnCode::CommandLineError,
        _ => ReturnCode::CommandFail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alias_registry::RegistryError;

    #[test]
    fn test_return_codes() {
        let usage = anyhow::Error::from(UsageError::new("bad"));
        let unknown = anyhow::Error::from(UnaliasError::UnknownAliases(vec!["x".to_string()]));
        let duplicate = anyhow::Error::from(RegistryError::DuplicateName {
            name: "x".to_string(),
        });

        assert_eq!(return_code_for(&usage), ReturnCode::CommandLineError);
        assert_eq!(return_code_for(&unknown), ReturnCode::CommandLineError);
        assert_eq!(return_code_for(&duplicate), ReturnCode::CommandFail);
        assert_eq!(
            return_code_for(&anyhow::anyhow!("anything else")),
            ReturnCode::CommandFail
        );
    }

    #[test]
    fn test_usage_error_context_keeps_exit_code() {
        let wrapped = anyhow::Error::from(UsageError::new("bad")).context("while parsing");
        assert_eq!(return_code_for(&wrapped), ReturnCode::CommandLineError);
    }
}
