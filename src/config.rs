//! Resolved configuration tree of an application using the runtime extensions.
pub mod error;
pub mod loader;
pub mod otel_env;
pub(crate) mod string_list;

use crate::logging::config::LoggingConfig;
use crate::oidc_client_filter::ClientFilterConfig;
use crate::otel::config::OTelRuntimeConfig;
use serde::{Deserialize, Deserializer};

/// Root of the configuration. Every section is optional and falls back to its defaults.
#[derive(Debug, Deserialize, Default, PartialEq, Clone)]
pub struct RuntimeConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub application: ApplicationConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub oidc_client_filter: ClientFilterConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub otel: OTelRuntimeConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub log: LoggingConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq, Clone)]
pub struct ApplicationConfig {
    /// Application name, used as service name when none is configured.
    #[serde(default)]
    pub name: Option<String>,
}

/// Deserializes a section left empty (`otel:`) as its defaults.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() {
        let config: RuntimeConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn sections_are_independent() {
        let config: RuntimeConfig = serde_yaml::from_str(
            r#"
application:
  name: orders
oidc_client_filter:
  register_filter: true
"#,
        )
        .unwrap();

        assert_eq!(config.application.name.as_deref(), Some("orders"));
        assert!(config.oidc_client_filter.register_filter());
        assert_eq!(config.oidc_client_filter.client_name(), None);
        assert_eq!(config.otel, OTelRuntimeConfig::default());
        assert_eq!(config.log, LoggingConfig::default());
    }

    #[test]
    fn empty_sections_are_default() {
        let config: RuntimeConfig =
            serde_yaml::from_str("application:
otel:
  bsp:
  traces:
log:
").unwrap();

        assert_eq!(config, RuntimeConfig::default());
    }
}
