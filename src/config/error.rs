use crate::otel::config::OTelConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeConfigError {
    #[error("error loading the runtime configuration: `{0}`")]
    Load(#[from] ::config::ConfigError),
    #[error("invalid OpenTelemetry configuration: `{0}`")]
    OTel(#[from] OTelConfigError),
}
