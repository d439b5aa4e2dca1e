use super::Cli;
use crate::defaults::EXTENSION_RUNTIME_CONFIG_VERSION;

#[derive(Debug)]
pub enum OneShotCommand {
    PrintVersion,
    PrintDebugInfo(Cli),
}

impl OneShotCommand {
    /// Runs the one-shot operation
    pub fn run_one_shot(&self) {
        match self {
            OneShotCommand::PrintVersion => {
                println!("{}", binary_metadata());
            }
            OneShotCommand::PrintDebugInfo(cli) => {
                println!("Printing debug info");
                println!("CLI: {cli:#?}");
            }
        }
    }
}

fn binary_metadata() -> String {
    format!("Extension runtime config Version: {EXTENSION_RUNTIME_CONFIG_VERSION}")
}
