// EN: src/bin/aliasctl.rs

use aliasctl::{
    cli::{Cli, dispatcher, return_code_for},
    core::paths,
    models::ReturnCode,
    state::AppContext,
};
use anyhow::Result;
use clap::Parser;
use colored::*;

/// The main entry point of the `aliasctl` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => exit_with_clap_error(&e),
    };

    if let Err(e) = run_cli(cli) {
        // Errors from a handler's own argument parser carry their own formatting.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            exit_with_clap_error(clap_err);
        }

        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(return_code_for(&e).code());
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let config_dir = paths::get_config_dir()?;
    let mut context = AppContext::from_config_dir(&config_dir)?;
    dispatcher::dispatch(cli.args, &mut context)
}

/// Prints a clap error (or the help/version it carries) and exits. Help and version go to
/// stdout and are not failures.
fn exit_with_clap_error(error: &clap::Error) -> ! {
    let _ = error.print();
    let code = if error.use_stderr() {
        ReturnCode::CommandLineError
    } else {
        ReturnCode::Ok
    };
    std::process::exit(code.code());
}
