use super::format::LoggingFormat;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::PrettyFields;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable overriding the crate log level.
const LOG_LEVEL_ENV_VAR: &str = "LOG_LEVEL";
/// Environment variable allowing logging directives for any crate.
const INSECURE_FINE_GRAINED_LEVEL_ENV_VAR: &str = "INSECURE_FINE_GRAINED_LEVEL";
const CRATE_NAME: &str = env!("CARGO_CRATE_NAME");

/// An enum representing possible errors during the logging initialization.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("init logging error: `{0}`")]
    TryInit(String),
    #[error("invalid logging directive `{0}`: `{1}`")]
    InvalidDirective(String, String),
}

/// Defines the logging configuration.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub(crate) format: LoggingFormat,
    #[serde(default)]
    pub(crate) level: LogLevel,
    /// Raw [EnvFilter] directives, they could enable logs of any dependency.
    #[serde(default)]
    pub(crate) insecure_fine_grained_level: Option<String>,
}

impl LoggingConfig {
    /// Attempts to initialize the global logging subscriber with the inner configuration.
    pub fn try_init(&self) -> Result<(), LoggingError> {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(self.format.ansi_colors)
            .with_target(self.format.target)
            .with_timer(ChronoLocal::new(self.format.timestamp.0.clone()))
            .fmt_fields(PrettyFields::new())
            .with_filter(self.filter()?);

        tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .map_err(|err| {
                LoggingError::TryInit(format!("unable to set global logging subscriber: {err}"))
            })?;

        debug!("Logging initialized successfully");
        Ok(())
    }

    /// Returns the filter to apply. The insecure fine grained level, from the config or the
    /// environment, takes precedence over the crate level.
    pub(crate) fn filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Some(insecure_filter) = self.insecure_filter()? {
            return Ok(insecure_filter);
        }

        let level = self.level.as_level().to_string().to_lowercase();
        let crate_directive = parse_directive(&format!("{CRATE_NAME}={level}"))?;

        Ok(EnvFilter::builder()
            .with_default_directive(crate_directive)
            .with_env_var(LOG_LEVEL_ENV_VAR)
            .from_env_lossy())
    }

    fn insecure_filter(&self) -> Result<Option<EnvFilter>, LoggingError> {
        let mut env_filter = EnvFilter::builder()
            // Only errors are logged for any crate unless some directive says otherwise.
            .with_default_directive(LevelFilter::ERROR.into())
            .with_env_var(INSECURE_FINE_GRAINED_LEVEL_ENV_VAR)
            .from_env()
            .map_err(|err| {
                LoggingError::InvalidDirective(
                    INSECURE_FINE_GRAINED_LEVEL_ENV_VAR.to_string(),
                    err.to_string(),
                )
            })?;

        if let Some(directives) = self.insecure_fine_grained_level.as_deref() {
            for directive in directives.split(',').filter(|d| !d.trim().is_empty()) {
                env_filter = env_filter.add_directive(parse_directive(directive.trim())?);
            }
        }

        if env_filter.to_string() == LevelFilter::ERROR.to_string() {
            return Ok(None);
        }
        Ok(Some(env_filter))
    }
}

fn parse_directive(directive: &str) -> Result<Directive, LoggingError> {
    directive
        .parse::<Directive>()
        .map_err(|err| LoggingError::InvalidDirective(directive.to_string(), err.to_string()))
}

#[derive(Debug, PartialEq, Clone)]
pub(crate) struct LogLevel(Level);

impl LogLevel {
    fn as_level(&self) -> Level {
        self.0
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self(Level::INFO)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value_str = String::deserialize(deserializer)?;
        Level::from_str(&value_str)
            .map(LogLevel)
            .map_err(serde::de::Error::custom)
    }
}
