// src/system/shim.rs

use crate::core::settings::ShellFlavor;
use crate::models::{AliasDefinition, WorkingDirectory};

/// Renders the content of the shim script for `alias`.
///
/// The shim replaces itself with `<launcher> exec <instance> -- <command> <args...>`, so the
/// exit status of the aliased command becomes the exit status of the shim.
///
/// # Errors
/// Fails if a value cannot be quoted for a POSIX shell (it contains a NUL byte).
pub fn render(
    alias: &AliasDefinition,
    launcher: &str,
    flavor: ShellFlavor,
) -> Result<String, shlex::QuoteError> {
    match flavor {
        ShellFlavor::Posix => render_posix(alias, launcher),
        ShellFlavor::Cmd => Ok(render_cmd(alias, launcher)),
    }
}

fn render_posix(alias: &AliasDefinition, launcher: &str) -> Result<String, shlex::QuoteError> {
    let mut line = format!(
        "exec {} exec {}",
        shlex::try_quote(launcher)?,
        shlex::try_quote(&alias.instance)?
    );
    if alias.working_directory == WorkingDirectory::Map {
        line.push_str(" --working-directory \"$PWD\"");
    }
    line.push_str(" --");

    // A command that does not split cleanly is passed through as a single word.
    let words = shlex::split(&alias.command).unwrap_or_else(|| vec![alias.command.clone()]);
    for word in &words {
        line.push(' ');
        line.push_str(&shlex::try_quote(word)?);
    }
    line.push_str(" \"$@\"");

    Ok(format!("#!/bin/sh\n\n{}\n", line))
}

fn render_cmd(alias: &AliasDefinition, launcher: &str) -> String {
    let mut line = format!(
        "{} exec {}",
        quote_cmd_word(launcher),
        quote_cmd_word(&alias.instance)
    );
    if alias.working_directory == WorkingDirectory::Map {
        line.push_str(" --working-directory \"%CD%\"");
    }
    line.push_str(" -- ");
    line.push_str(&escape_cmd_command(&alias.command));
    line.push_str(" %*");

    format!("@echo off\r\n{}\r\n", line)
}

/// Wraps `word` in double quotes for a batch file. Embedded quotes are doubled and `%` is
/// doubled so it is not read as a variable reference.
fn quote_cmd_word(word: &str) -> String {
    format!("\"{}\"", word.replace('%', "%%").replace('"', "\"\""))
}

/// Makes a command line literal for `cmd.exe`. Double quotes are kept so the command can
/// group its own arguments; outside them `&`, `|`, `<`, `>` and `^` are caret-escaped.
/// `%` is doubled everywhere.
fn escape_cmd_command(command: &str) -> String {
    let mut out = String::with_capacity(command.len());
    let mut in_quotes = false;
    for c in command.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                out.push(c);
            }
            '%' => out.push_str("%%"),
            '&' | '|' | '<' | '>' | '^' if !in_quotes => {
                out.push('^');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
