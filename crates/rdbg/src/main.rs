//! rdbg CLI - remote debugging backend.

mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "rdbg=debug" } else { "rdbg=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse().unwrap()))
        .with_target(false)
        .init();

    let exit_code = commands::run_command(&cli);

    std::process::exit(exit_code);
}
