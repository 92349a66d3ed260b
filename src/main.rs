mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command.take() {
        Some(Commands::Config { command }) => cli::config::run_config(&command),
        Some(Commands::Why { rule, list }) => cli::why::run_why(rule, list),
        None => cli::lint::run_lint(cli),
    }
}
