//! Resolves the runtime configuration from the command line arguments and the environment and
//! prints the result.
use extension_runtime_config::cli::{Cli, CliCommand};
use std::process::ExitCode;
use tracing::info;

fn main() -> ExitCode {
    match Cli::init() {
        Ok(CliCommand::OneShot(command)) => {
            command.run_one_shot();
            ExitCode::SUCCESS
        }
        Ok(CliCommand::Resolved(config)) => {
            println!("{config:#?}");
            info!("Exiting gracefully");
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Logging might not be initialized yet.
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
