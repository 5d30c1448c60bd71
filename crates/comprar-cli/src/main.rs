//! Entry point for the `comprar` scenario runner.

use clap::Parser;
use comprar_cli::{init_tracing, scenarios, Cli, CliResult, Commands};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match cli.command {
        Commands::Scenarios => {
            scenarios::list();
            Ok(())
        }
        Commands::Smoke(args) => scenarios::run_smoke(&args),
        Commands::Clean(args) => scenarios::run_clean(&args),
    }
}
