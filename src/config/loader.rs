use super::RuntimeConfig;
use super::error::RuntimeConfigError;
use super::otel_env::OtelEnvironment;
use crate::defaults::{APPLICATION_CONFIG_ENV_VAR_PREFIX, APPLICATION_CONFIG_ENV_VAR_SEPARATOR};
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Map};
use std::path::PathBuf;
use tracing::debug;

const MP_COMPATIBILITY_KEY: &str = "otel.mp_compatibility";

/// RuntimeConfigLoader loads a whole RuntimeConfig
#[cfg_attr(test, mockall::automock)]
pub trait RuntimeConfigLoader {
    fn load(&self) -> Result<RuntimeConfig, RuntimeConfigError>;
}

/// Where the YAML part of the configuration comes from.
#[derive(Debug, Clone)]
enum YamlSource {
    Path(PathBuf),
    Content(String),
}

/// Loads the [RuntimeConfig] from, lowest precedence first:
/// - the standard OpenTelemetry environment variables (`OTEL_*`),
/// - the YAML file, if any,
/// - the application environment variables, e.g. `APP_OTEL__SERVICE_NAME`.
///
/// When `otel.mp_compatibility` is enabled in the application sources the `OTEL_*` variables
/// take the highest precedence instead.
pub struct RuntimeConfigStore {
    config_builder: ConfigBuilder<DefaultState>,
    yaml: Option<YamlSource>,
    env: Option<Map<String, String>>,
}

impl RuntimeConfigLoader for RuntimeConfigStore {
    fn load(&self) -> Result<RuntimeConfig, RuntimeConfigError> {
        self._load_config()
    }
}

impl Default for RuntimeConfigStore {
    fn default() -> Self {
        Self {
            config_builder: Config::builder(),
            yaml: None,
            env: None,
        }
    }
}

impl RuntimeConfigStore {
    /// Reads the YAML configuration from `path`, which must exist.
    pub fn new(path: PathBuf) -> Self {
        Self {
            yaml: Some(YamlSource::Path(path)),
            ..Default::default()
        }
    }

    pub fn from_yaml(content: impl Into<String>) -> Self {
        Self {
            yaml: Some(YamlSource::Content(content.into())),
            ..Default::default()
        }
    }

    /// Reads environment variables from `env` instead of the process environment.
    pub fn with_env(self, env: Map<String, String>) -> Self {
        Self {
            env: Some(env),
            ..self
        }
    }

    fn _load_config(&self) -> Result<RuntimeConfig, RuntimeConfigError> {
        let mp_compatibility = self.mp_compatibility()?;
        debug!(mp_compatibility, "resolving runtime configuration");

        let config_builder = if mp_compatibility {
            self.with_application_sources(self.config_builder.clone())
                .add_source(self.otel_environment())
        } else {
            self.with_application_sources(
                self.config_builder
                    .clone()
                    .add_source(self.otel_environment()),
            )
        };

        let mut config = config_builder
            .build()?
            .try_deserialize::<RuntimeConfig>()?;

        config.otel = config
            .otel
            .resolve_service_name(config.application.name.as_deref())?;
        config.otel.validate()?;

        Ok(config)
    }

    /// Reads `otel.mp_compatibility` from the application sources only.
    fn mp_compatibility(&self) -> Result<bool, RuntimeConfigError> {
        let config = self
            .with_application_sources(self.config_builder.clone())
            .build()?;

        match config.get_bool(MP_COMPATIBILITY_KEY) {
            Ok(enabled) => Ok(enabled),
            Err(ConfigError::NotFound(_)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn with_application_sources(
        &self,
        builder: ConfigBuilder<DefaultState>,
    ) -> ConfigBuilder<DefaultState> {
        let builder = match &self.yaml {
            Some(YamlSource::Path(path)) => builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Yaml)
                    .required(true),
            ),
            Some(YamlSource::Content(content)) => {
                builder.add_source(File::from_str(content, FileFormat::Yaml))
            }
            None => builder,
        };
        // Eg.. `APP_OTEL__SERVICE_NAME=orders` sets the `otel.service_name` key.
        // Double underscore because config keys are already snake_case.
        builder.add_source(
            Environment::with_prefix(APPLICATION_CONFIG_ENV_VAR_PREFIX)
                .prefix_separator("_")
                .separator(APPLICATION_CONFIG_ENV_VAR_SEPARATOR)
                .source(self.env.clone()),
        )
    }

    fn otel_environment(&self) -> OtelEnvironment {
        OtelEnvironment::default().source(self.env.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oidc_client_filter::ClientFilterConfig;
    use crate::otel::config::{OTelConfigError, OTelRuntimeConfig};
    use crate::otel::sampler::SamplerKind;
    use crate::otel::semconv::SemanticConventions;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use serial_test::serial;
    use std::env;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;

    fn env_of(vars: &[(&str, &str)]) -> Map<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(yaml: &str, vars: &[(&str, &str)]) -> Result<RuntimeConfig, RuntimeConfigError> {
        RuntimeConfigStore::from_yaml(yaml)
            .with_env(env_of(vars))
            .load()
    }

    #[test]
    fn empty_sources_resolve_defaults() {
        let config = load("", &[]).unwrap();

        assert_eq!(config.oidc_client_filter, ClientFilterConfig::default());
        assert_eq!(
            config.otel,
            OTelRuntimeConfig {
                service_name: Some("unset".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn only_register_filter() {
        let config = load("oidc_client_filter:\n  register_filter: true\n", &[]).unwrap();

        assert!(config.oidc_client_filter.register_filter());
        assert_eq!(config.oidc_client_filter.client_name(), None);
    }

    #[test]
    fn shutdown_wait_time_override() {
        let config = load("otel:\n  experimental_shutdown_wait_time: 5s\n", &[]).unwrap();

        assert_eq!(
            config.otel.experimental_shutdown_wait_time(),
            Duration::from_secs(5)
        );
        assert_eq!(
            config.otel,
            OTelRuntimeConfig {
                experimental_shutdown_wait_time: Duration::from_secs(5),
                service_name: Some("unset".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn service_name_from_application_name() {
        let config = load("application:\n  name: orders\n", &[]).unwrap();
        assert_eq!(config.otel.service_name(), Some("orders"));
    }

    #[test]
    fn blank_service_name_falls_back_to_application_name() {
        let config = load(
            "application:\n  name: orders\n",
            &[("APP_OTEL__SERVICE_NAME", "")],
        )
        .unwrap();

        assert_eq!(config.otel.service_name(), Some("orders"));
    }

    #[test]
    fn empty_otel_section_keeps_defaults() {
        let config = load("otel:\noidc_client_filter:\n", &[("OTEL_SERVICE_NAME", "orders")]).unwrap();

        assert_eq!(config.otel.service_name(), Some("orders"));
        assert_eq!(config.oidc_client_filter, ClientFilterConfig::default());
    }

    #[rstest]
    #[case::application_wins_by_default("false", "from-app")]
    #[case::otel_wins_with_mp_compatibility("true", "from-otel")]
    fn service_name_precedence(#[case] mp_compatibility: &str, #[case] expected: &str) {
        let yaml = format!("otel:\n  service_name: from-app\n  mp_compatibility: {mp_compatibility}\n");

        let config = load(&yaml, &[("OTEL_SERVICE_NAME", "from-otel")]).unwrap();

        assert_eq!(config.otel.service_name(), Some(expected));
        assert_eq!(config.otel.mp_compatibility(), mp_compatibility == "true");
    }

    #[test]
    fn otel_env_fills_what_the_application_does_not_set() {
        let config = load(
            "otel:\n  traces:\n    sampler: traceidratio\n",
            &[
                ("OTEL_TRACES_SAMPLER", "always_off"),
                ("OTEL_TRACES_SAMPLER_ARG", "0.5"),
                ("OTEL_BSP_SCHEDULE_DELAY", "250"),
                ("OTEL_SEMCONV_STABILITY_OPT_IN", "http/dup"),
            ],
        )
        .unwrap();

        assert_eq!(config.otel.traces().sampler(), SamplerKind::TraceIdRatio);
        assert_eq!(config.otel.traces().sampler_arg(), Some(0.5));
        assert_eq!(
            config.otel.bsp().schedule_delay(),
            Duration::from_millis(250)
        );
        assert_eq!(
            config.otel.semantic_conventions(),
            SemanticConventions::Duplicate
        );
    }

    #[test]
    fn mp_compatibility_from_application_env() {
        let config = load(
            "otel:\n  service_name: from-app\n",
            &[
                ("APP_OTEL__MP_COMPATIBILITY", "true"),
                ("OTEL_SERVICE_NAME", "from-otel"),
            ],
        )
        .unwrap();

        assert_eq!(config.otel.service_name(), Some("from-otel"));
    }

    #[test]
    fn application_env_overrides_file() {
        let config = load(
            "otel:\n  bsp:\n    max_queue_size: 100\n",
            &[("APP_OTEL__BSP__MAX_QUEUE_SIZE", "4096")],
        )
        .unwrap();

        assert_eq!(config.otel.bsp().max_queue_size(), 4096);
    }

    #[test]
    fn comma_separated_lists() {
        let config = load(
            "otel:\n  experimental_resource_disabled_keys: [host.name]\n",
            &[("OTEL_RESOURCE_ATTRIBUTES", "team=core,service.name=checkout")],
        )
        .unwrap();

        assert_eq!(
            config.otel.resource_attributes(),
            Some(["team=core".to_string(), "service.name=checkout".to_string()].as_slice())
        );
        assert_eq!(
            config.otel.experimental_resource_disabled_keys(),
            Some(["host.name".to_string()].as_slice())
        );
        assert_eq!(config.otel.service_name(), Some("checkout"));
    }

    #[test]
    fn invalid_values_fail() {
        assert_matches!(
            load("otel:\n  otel_semconv_stability_opt_in: grpc\n", &[]),
            Err(RuntimeConfigError::Load(_))
        );
        assert_matches!(
            load("", &[("OTEL_RESOURCE_ATTRIBUTES", "no-separator")]),
            Err(RuntimeConfigError::OTel(OTelConfigError::InvalidResourceAttribute(_)))
        );
        assert_matches!(
            load(
                "otel:\n  bsp:\n    max_queue_size: 10\n",
                &[]
            ),
            Err(RuntimeConfigError::OTel(OTelConfigError::InvalidBatchSize { .. }))
        );
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = RuntimeConfigStore::new(dir.path().join("missing.yaml")).with_env(Map::new());

        assert_matches!(store.load(), Err(RuntimeConfigError::Load(_)));
    }

    #[test]
    #[serial]
    fn load_from_file_and_process_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("application.yaml");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            "application:\n  name: orders\noidc_client_filter:\n  client_name: backend\n"
        )
        .unwrap();

        let env_var_name = "APP_OIDC_CLIENT_FILTER__REGISTER_FILTER";
        unsafe { env::set_var(env_var_name, "true") };

        let config = RuntimeConfigStore::new(path).load();

        unsafe { env::remove_var(env_var_name) };

        let config = config.unwrap();
        assert!(config.oidc_client_filter.register_filter());
        assert_eq!(config.oidc_client_filter.client_name(), Some("backend"));
        assert_eq!(config.application.name.as_deref(), Some("orders"));
    }
}
