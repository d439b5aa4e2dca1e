//! [Source] reading the standard OpenTelemetry environment variables (`OTEL_*`) into the keys of
//! the `otel` section.
use ::config::{ConfigError, Map, Source, Value};

/// How the value of a variable is turned into a configuration value.
#[derive(Debug, Clone, Copy)]
enum Conversion {
    Verbatim,
    /// Plain integers are milliseconds, as defined by the OpenTelemetry environment variables.
    Milliseconds,
}

const OTEL_ENV_VARS: &[(&str, &str, Conversion)] = &[
    ("OTEL_SDK_DISABLED", "otel.sdk_disabled", Conversion::Verbatim),
    ("OTEL_SERVICE_NAME", "otel.service_name", Conversion::Verbatim),
    ("OTEL_RESOURCE_ATTRIBUTES", "otel.resource_attributes", Conversion::Verbatim),
    (
        "OTEL_EXPERIMENTAL_RESOURCE_DISABLED_KEYS",
        "otel.experimental_resource_disabled_keys",
        Conversion::Verbatim,
    ),
    ("OTEL_TRACES_SAMPLER", "otel.traces.sampler", Conversion::Verbatim),
    ("OTEL_TRACES_SAMPLER_ARG", "otel.traces.sampler_arg", Conversion::Verbatim),
    (
        "OTEL_ATTRIBUTE_VALUE_LENGTH_LIMIT",
        "otel.attribute.value_length_limit",
        Conversion::Verbatim,
    ),
    ("OTEL_ATTRIBUTE_COUNT_LIMIT", "otel.attribute.count_limit", Conversion::Verbatim),
    (
        "OTEL_SPAN_ATTRIBUTE_VALUE_LENGTH_LIMIT",
        "otel.span.attribute_value_length_limit",
        Conversion::Verbatim,
    ),
    (
        "OTEL_SPAN_ATTRIBUTE_COUNT_LIMIT",
        "otel.span.attribute_count_limit",
        Conversion::Verbatim,
    ),
    ("OTEL_SPAN_EVENT_COUNT_LIMIT", "otel.span.event_count_limit", Conversion::Verbatim),
    ("OTEL_SPAN_LINK_COUNT_LIMIT", "otel.span.link_count_limit", Conversion::Verbatim),
    ("OTEL_BSP_SCHEDULE_DELAY", "otel.bsp.schedule_delay", Conversion::Milliseconds),
    ("OTEL_BSP_EXPORT_TIMEOUT", "otel.bsp.export_timeout", Conversion::Milliseconds),
    ("OTEL_BSP_MAX_QUEUE_SIZE", "otel.bsp.max_queue_size", Conversion::Verbatim),
    (
        "OTEL_BSP_MAX_EXPORT_BATCH_SIZE",
        "otel.bsp.max_export_batch_size",
        Conversion::Verbatim,
    ),
    (
        "OTEL_SEMCONV_STABILITY_OPT_IN",
        "otel.otel_semconv_stability_opt_in",
        Conversion::Verbatim,
    ),
];

/// Reads the `OTEL_*` variables from the process environment, or from the provided map if any.
/// Empty variables are considered unset.
#[derive(Debug, Clone, Default)]
pub struct OtelEnvironment {
    source: Option<Map<String, String>>,
}

impl OtelEnvironment {
    pub fn source(mut self, source: Option<Map<String, String>>) -> Self {
        self.source = source;
        self
    }
}

impl Source for OtelEnvironment {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let origin = String::from("the OpenTelemetry environment");
        let lookup = |var: &str| match &self.source {
            Some(source) => source.get(var).cloned(),
            None => std::env::var(var).ok(),
        };

        let mut values = Map::new();
        for (var, key, conversion) in OTEL_ENV_VARS {
            let Some(raw) = lookup(var).filter(|value| !value.trim().is_empty()) else {
                continue;
            };
            let value = match conversion {
                Conversion::Verbatim => raw.trim().to_string(),
                Conversion::Milliseconds => as_milliseconds(raw.trim()),
            };
            values.insert(key.to_string(), Value::new(Some(&origin), value));
        }
        Ok(values)
    }
}

fn as_milliseconds(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_digit()) {
        format!("{value}ms")
    } else {
        value.to_string()
    }
}
