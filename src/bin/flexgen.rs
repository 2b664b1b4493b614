//! `flexgen` binary: parse flags, set up logging, run one command.

use clap::Parser;
use flexgen::cli::{logging_config_for, map_error, Cli, CliOverrides, RunContext};
use flexgen::logging::init_logging;
use std::process::ExitCode;
use tracing::{debug, error};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(Some(&logging_config_for(&cli))) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }
    debug!(workspace = %cli.workspace.display(), "flexgen starting");

    let outcome = RunContext::new(
        cli.workspace.clone(),
        cli.config.clone(),
        CliOverrides::from(&cli),
    )
    .and_then(|context| context.execute(&cli.command));

    match outcome {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "flexgen exiting with failure");
            eprintln!("{}", map_error(&e));
            ExitCode::FAILURE
        }
    }
}
