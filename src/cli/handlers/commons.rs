// src/cli/handlers/commons.rs

// Output helpers shared by the handlers.

use colored::Colorize;

use crate::system::scripts::ScriptWarning;

/// Prints tolerated script failures to stderr. They never change the exit code.
pub fn print_warnings(warnings: &[ScriptWarning]) {
    for warning in warnings {
        eprintln!("{}: {}", t!("common.warning").yellow().bold(), warning);
    }
}

/// `1 alias` / `3 aliases`.
pub fn count_aliases(count: usize) -> String {
    if count == 1 {
        format!(t!("common.count.alias_one"), count = count)
    } else {
        format!(t!("common.count.alias_many"), count = count)
    }
}
