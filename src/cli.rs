mod one_shot_operation;

use crate::config::RuntimeConfig;
use crate::config::error::RuntimeConfigError;
use crate::config::loader::{RuntimeConfigLoader, RuntimeConfigStore};
use crate::logging::config::LoggingError;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

pub use one_shot_operation::OneShotCommand;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("could not read the runtime configuration: `{0}`")]
    ConfigRead(#[from] RuntimeConfigError),
    #[error("could not initialize logging: `{0}`")]
    LoggingInit(#[from] LoggingError),
}

/// What action was requested from the CLI?
#[derive(Debug)]
pub enum CliCommand {
    /// Configuration resolved, continue with it.
    Resolved(Box<RuntimeConfig>),
    /// Do an "one-shot" operation and exit successfully.
    OneShot(OneShotCommand),
}

#[derive(Parser, Debug)]
#[command(author, about, long_about = None)] // Read from `Cargo.toml`
pub struct Cli {
    /// YAML configuration file. Without it only the environment is read.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    print_debug_info: bool,

    #[arg(long)]
    version: bool,
}

impl Cli {
    /// Parses command line arguments and decides how the application runs
    pub fn init() -> Result<CliCommand, CliError> {
        Self::parse().command()
    }

    fn command(self) -> Result<CliCommand, CliError> {
        if self.version {
            return Ok(CliCommand::OneShot(OneShotCommand::PrintVersion));
        }
        if self.print_debug_info {
            return Ok(CliCommand::OneShot(OneShotCommand::PrintDebugInfo(self)));
        }

        let store = match self.config {
            Some(path) => RuntimeConfigStore::new(path),
            None => RuntimeConfigStore::default(),
        };
        let config = load_config(&store)?;
        config.log.try_init()?;
        info!(
            service_name = config.otel.service_name(),
            sdk_disabled = config.otel.sdk_disabled(),
            "runtime configuration resolved"
        );

        Ok(CliCommand::Resolved(Box::new(config)))
    }
}

/// Loads the configuration through any [RuntimeConfigLoader].
pub fn load_config<L>(loader: &L) -> Result<RuntimeConfig, CliError>
where
    L: RuntimeConfigLoader,
{
    let config = loader.load()?;
    debug!(
        mp_compatibility = config.otel.mp_compatibility(),
        "runtime configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::loader::MockRuntimeConfigLoader;
    use crate::otel::config::OTelConfigError;
    use assert_matches::assert_matches;
    use tracing_test::traced_test;

    #[test]
    fn version_is_a_one_shot_command() {
        let cli = Cli::try_parse_from(["extension-runtime-config", "--version"]).unwrap();

        assert_matches!(
            cli.command(),
            Ok(CliCommand::OneShot(OneShotCommand::PrintVersion))
        );
    }

    #[test]
    fn debug_info_keeps_the_cli() {
        let cli = Cli::try_parse_from([
            "extension-runtime-config",
            "--config",
            "/etc/app/application.yaml",
            "--print-debug-info",
        ])
        .unwrap();

        assert_matches!(
            cli.command(),
            Ok(CliCommand::OneShot(OneShotCommand::PrintDebugInfo(cli))) => {
                assert_eq!(cli.config, Some(PathBuf::from("/etc/app/application.yaml")));
            }
        );
    }

    #[traced_test]
    #[test]
    fn load_config_from_loader() {
        let mut loader = MockRuntimeConfigLoader::new();
        loader
            .expect_load()
            .once()
            .returning(|| Ok(RuntimeConfig::default()));

        assert_eq!(load_config(&loader).unwrap(), RuntimeConfig::default());
        assert!(logs_contain("runtime configuration loaded"));
    }

    #[test]
    fn load_config_error() {
        let mut loader = MockRuntimeConfigLoader::new();
        loader.expect_load().once().returning(|| {
            Err(RuntimeConfigError::OTel(
                OTelConfigError::InvalidResourceAttribute("invalid".to_string()),
            ))
        });

        assert_matches!(load_config(&loader), Err(CliError::ConfigRead(_)));
    }
}
