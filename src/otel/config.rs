use super::sampler::SamplerKind;
use super::semconv::{SemanticConventions, SemconvStabilityOptIn};
use crate::config::null_as_default;
use crate::config::string_list::deserialize_optional_string_list;
use crate::defaults::{
    DEFAULT_ATTRIBUTE_COUNT_LIMIT, DEFAULT_BSP_EXPORT_TIMEOUT, DEFAULT_BSP_MAX_EXPORT_BATCH_SIZE,
    DEFAULT_BSP_MAX_QUEUE_SIZE, DEFAULT_BSP_SCHEDULE_DELAY, DEFAULT_SHUTDOWN_WAIT_TIME,
    DEFAULT_SPAN_ATTRIBUTE_COUNT_LIMIT, DEFAULT_SPAN_EVENT_COUNT_LIMIT,
    DEFAULT_SPAN_LINK_COUNT_LIMIT, SERVICE_NAME_RESOURCE_KEY, UNSET_SERVICE_NAME,
};
use duration_str::deserialize_duration;
use opentelemetry_sdk::trace;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors found while interpreting already deserialized OpenTelemetry values.
#[derive(Error, Debug, PartialEq)]
pub enum OTelConfigError {
    #[error("invalid resource attribute `{0}`, expected `key=value`")]
    InvalidResourceAttribute(String),
    #[error("invalid sampler argument `{arg}` for sampler `{sampler}`: must be within [0, 1]")]
    InvalidSamplerArg { sampler: SamplerKind, arg: f64 },
    #[error(
        "bsp max_export_batch_size ({batch}) must not be greater than max_queue_size ({queue})"
    )]
    InvalidBatchSize { batch: usize, queue: usize },
}

/// OpenTelemetry SDK runtime configuration.
///
/// It is resolved once by the [loader](crate::config::loader) and handed to the SDK bootstrap
/// as an immutable value. Every field has a default, so an empty configuration is valid.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct OTelRuntimeConfig {
    /// If true, the OpenTelemetry SDK is not initialized at all.
    #[serde(default)]
    pub(crate) sdk_disabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) traces: TracesRuntimeConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) attribute: AttributeConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) span: SpanConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) bsp: BatchSpanProcessorConfig,
    /// Resource attributes in the `key1=val1,key2=val2` format.
    #[serde(default, deserialize_with = "deserialize_optional_string_list")]
    pub(crate) resource_attributes: Option<Vec<String>>,
    /// Logical service name. Takes precedence over `service.name` from [Self::resource_attributes]
    /// and over the application name.
    #[serde(default)]
    pub(crate) service_name: Option<String>,
    /// Resource attribute keys that are filtered out of the resource.
    #[serde(default, deserialize_with = "deserialize_optional_string_list")]
    pub(crate) experimental_resource_disabled_keys: Option<Vec<String>>,
    /// Maximum time to wait for the SDK to flush unsent spans and shut down.
    #[serde(
        default = "default_shutdown_wait_time",
        deserialize_with = "deserialize_duration"
    )]
    pub(crate) experimental_shutdown_wait_time: Duration,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) instrument: InstrumentRuntimeConfig,
    #[serde(default)]
    pub(crate) otel_semconv_stability_opt_in: Option<SemconvStabilityOptIn>,
    /// Gives priority to the standard `OTEL_*` configuration over the application one.
    #[serde(default)]
    pub(crate) mp_compatibility: bool,
}

fn default_shutdown_wait_time() -> Duration {
    DEFAULT_SHUTDOWN_WAIT_TIME
}

impl Default for OTelRuntimeConfig {
    fn default() -> Self {
        Self {
            sdk_disabled: false,
            traces: Default::default(),
            attribute: Default::default(),
            span: Default::default(),
            bsp: Default::default(),
            resource_attributes: None,
            service_name: None,
            experimental_resource_disabled_keys: None,
            experimental_shutdown_wait_time: DEFAULT_SHUTDOWN_WAIT_TIME,
            instrument: Default::default(),
            otel_semconv_stability_opt_in: None,
            mp_compatibility: false,
        }
    }
}

impl OTelRuntimeConfig {
    pub fn sdk_disabled(&self) -> bool {
        self.sdk_disabled
    }

    pub fn traces(&self) -> &TracesRuntimeConfig {
        &self.traces
    }

    pub fn attribute(&self) -> &AttributeConfig {
        &self.attribute
    }

    pub fn span(&self) -> &SpanConfig {
        &self.span
    }

    pub fn bsp(&self) -> &BatchSpanProcessorConfig {
        &self.bsp
    }

    pub fn resource_attributes(&self) -> Option<&[String]> {
        self.resource_attributes.as_deref()
    }

    /// Returns the service name. Once loaded, it is always set: see [Self::resolve_service_name].
    pub fn service_name(&self) -> Option<&str> {
        self.service_name.as_deref()
    }

    pub fn experimental_resource_disabled_keys(&self) -> Option<&[String]> {
        self.experimental_resource_disabled_keys.as_deref()
    }

    pub fn experimental_shutdown_wait_time(&self) -> Duration {
        self.experimental_shutdown_wait_time
    }

    pub fn instrument(&self) -> &InstrumentRuntimeConfig {
        &self.instrument
    }

    pub fn otel_semconv_stability_opt_in(&self) -> Option<SemconvStabilityOptIn> {
        self.otel_semconv_stability_opt_in
    }

    pub fn semantic_conventions(&self) -> SemanticConventions {
        self.otel_semconv_stability_opt_in.into()
    }

    pub fn mp_compatibility(&self) -> bool {
        self.mp_compatibility
    }

    /// Parses [Self::resource_attributes] into `(key, value)` pairs. Values may contain `=`, only
    /// the first one splits the entry.
    pub fn resource_attribute_pairs(&self) -> Result<Vec<(String, String)>, OTelConfigError> {
        self.resource_attributes
            .iter()
            .flatten()
            .map(|entry| {
                entry
                    .split_once('=')
                    .map(|(key, value)| (key.trim(), value.trim()))
                    .filter(|(key, _)| !key.is_empty())
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .ok_or_else(|| OTelConfigError::InvalidResourceAttribute(entry.clone()))
            })
            .collect()
    }

    /// Resolves the service name in order: explicit value, `service.name` resource attribute,
    /// application name and finally [UNSET_SERVICE_NAME].
    pub(crate) fn resolve_service_name(
        mut self,
        application_name: Option<&str>,
    ) -> Result<Self, OTelConfigError> {
        // Blank values are unset, like empty environment variables.
        self.service_name = self
            .service_name
            .filter(|service_name| !service_name.trim().is_empty());
        if self.service_name.is_none() {
            let from_attributes = self
                .resource_attribute_pairs()?
                .into_iter()
                .find(|(key, _)| key == SERVICE_NAME_RESOURCE_KEY)
                .map(|(_, value)| value);

            self.service_name = Some(
                from_attributes
                    .or(application_name.map(String::from))
                    .unwrap_or_else(|| UNSET_SERVICE_NAME.to_string()),
            );
        }
        Ok(self)
    }

    /// Returns the SDK span limits. The general attribute count limit applies to events and
    /// links, which have no specific setting.
    pub fn span_limits(&self) -> trace::SpanLimits {
        trace::SpanLimits {
            max_attributes_per_span: self.span.attribute_count_limit,
            max_events_per_span: self.span.event_count_limit,
            max_links_per_span: self.span.link_count_limit,
            max_attributes_per_event: self.attribute.count_limit,
            max_attributes_per_link: self.attribute.count_limit,
        }
    }

    /// Checks the values that serde cannot reject on its own.
    pub(crate) fn validate(&self) -> Result<(), OTelConfigError> {
        self.resource_attribute_pairs()?;
        self.traces.validate()?;
        self.bsp.validate()
    }
}

/// Traces runtime configuration.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct TracesRuntimeConfig {
    /// Sampler to use, see [SamplerKind].
    #[serde(default)]
    pub(crate) sampler: SamplerKind,
    /// Argument for the sampler, only meaningful for the ratio based ones.
    #[serde(default)]
    pub(crate) sampler_arg: Option<f64>,
    /// Suppresses tracing of non-application endpoints (health, metrics, dev UI...).
    #[serde(default = "enabled")]
    pub(crate) suppress_non_application_uris: bool,
    /// Includes static resources in traces.
    #[serde(default)]
    pub(crate) include_static_resources: bool,
}

impl Default for TracesRuntimeConfig {
    fn default() -> Self {
        Self {
            sampler: SamplerKind::default(),
            sampler_arg: None,
            suppress_non_application_uris: true,
            include_static_resources: false,
        }
    }
}

impl TracesRuntimeConfig {
    pub fn sampler(&self) -> SamplerKind {
        self.sampler
    }

    pub fn sampler_arg(&self) -> Option<f64> {
        self.sampler_arg
    }

    pub fn suppress_non_application_uris(&self) -> bool {
        self.suppress_non_application_uris
    }

    pub fn include_static_resources(&self) -> bool {
        self.include_static_resources
    }

    /// Returns the SDK sampler for the configured kind and argument.
    pub fn to_sampler(&self) -> trace::Sampler {
        self.sampler.to_sampler(self.sampler_arg)
    }

    fn validate(&self) -> Result<(), OTelConfigError> {
        match self.sampler_arg {
            Some(arg) if self.sampler.is_ratio_based() && !(0.0..=1.0).contains(&arg) => {
                Err(OTelConfigError::InvalidSamplerArg {
                    sampler: self.sampler,
                    arg,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Limits applied to every attribute, see the attribute limits section of the OpenTelemetry
/// specification.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct AttributeConfig {
    /// Maximum allowed attribute value size. No limit if not set.
    #[serde(default)]
    pub(crate) value_length_limit: Option<u32>,
    /// Maximum allowed attribute count.
    #[serde(default = "default_attribute_count_limit")]
    pub(crate) count_limit: u32,
}

fn default_attribute_count_limit() -> u32 {
    DEFAULT_ATTRIBUTE_COUNT_LIMIT
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            value_length_limit: None,
            count_limit: DEFAULT_ATTRIBUTE_COUNT_LIMIT,
        }
    }
}

impl AttributeConfig {
    pub fn value_length_limit(&self) -> Option<u32> {
        self.value_length_limit
    }

    pub fn count_limit(&self) -> u32 {
        self.count_limit
    }
}

/// Span limits.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct SpanConfig {
    /// Maximum allowed span attribute value size. No limit if not set.
    #[serde(default)]
    pub(crate) attribute_value_length_limit: Option<u32>,
    #[serde(default = "default_span_attribute_count_limit")]
    pub(crate) attribute_count_limit: u32,
    #[serde(default = "default_span_event_count_limit")]
    pub(crate) event_count_limit: u32,
    #[serde(default = "default_span_link_count_limit")]
    pub(crate) link_count_limit: u32,
}

fn default_span_attribute_count_limit() -> u32 {
    DEFAULT_SPAN_ATTRIBUTE_COUNT_LIMIT
}

fn default_span_event_count_limit() -> u32 {
    DEFAULT_SPAN_EVENT_COUNT_LIMIT
}

fn default_span_link_count_limit() -> u32 {
    DEFAULT_SPAN_LINK_COUNT_LIMIT
}

impl Default for SpanConfig {
    fn default() -> Self {
        Self {
            attribute_value_length_limit: None,
            attribute_count_limit: DEFAULT_SPAN_ATTRIBUTE_COUNT_LIMIT,
            event_count_limit: DEFAULT_SPAN_EVENT_COUNT_LIMIT,
            link_count_limit: DEFAULT_SPAN_LINK_COUNT_LIMIT,
        }
    }
}

impl SpanConfig {
    pub fn attribute_value_length_limit(&self) -> Option<u32> {
        self.attribute_value_length_limit
    }

    pub fn attribute_count_limit(&self) -> u32 {
        self.attribute_count_limit
    }

    pub fn event_count_limit(&self) -> u32 {
        self.event_count_limit
    }

    pub fn link_count_limit(&self) -> u32 {
        self.link_count_limit
    }
}

/// Holds the batch span processor tuning. Check [trace::BatchSpanProcessor] for details.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct BatchSpanProcessorConfig {
    /// Interval between two consecutive exports.
    #[serde(
        default = "default_bsp_schedule_delay",
        deserialize_with = "deserialize_duration"
    )]
    pub(crate) schedule_delay: Duration,
    /// Maximum queue size. Spans are dropped once it is full.
    #[serde(default = "default_bsp_max_queue_size")]
    pub(crate) max_queue_size: usize,
    /// Maximum batch size for every export.
    #[serde(default = "default_bsp_max_export_batch_size")]
    pub(crate) max_export_batch_size: usize,
    /// Maximum allowed time to export data.
    #[serde(
        default = "default_bsp_export_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub(crate) export_timeout: Duration,
}

fn default_bsp_schedule_delay() -> Duration {
    DEFAULT_BSP_SCHEDULE_DELAY
}

fn default_bsp_max_queue_size() -> usize {
    DEFAULT_BSP_MAX_QUEUE_SIZE
}

fn default_bsp_max_export_batch_size() -> usize {
    DEFAULT_BSP_MAX_EXPORT_BATCH_SIZE
}

fn default_bsp_export_timeout() -> Duration {
    DEFAULT_BSP_EXPORT_TIMEOUT
}

impl Default for BatchSpanProcessorConfig {
    fn default() -> Self {
        Self {
            schedule_delay: DEFAULT_BSP_SCHEDULE_DELAY,
            max_queue_size: DEFAULT_BSP_MAX_QUEUE_SIZE,
            max_export_batch_size: DEFAULT_BSP_MAX_EXPORT_BATCH_SIZE,
            export_timeout: DEFAULT_BSP_EXPORT_TIMEOUT,
        }
    }
}

impl BatchSpanProcessorConfig {
    pub fn schedule_delay(&self) -> Duration {
        self.schedule_delay
    }

    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }

    pub fn max_export_batch_size(&self) -> usize {
        self.max_export_batch_size
    }

    pub fn export_timeout(&self) -> Duration {
        self.export_timeout
    }

    fn validate(&self) -> Result<(), OTelConfigError> {
        if self.max_export_batch_size > self.max_queue_size {
            return Err(OTelConfigError::InvalidBatchSize {
                batch: self.max_export_batch_size,
                queue: self.max_queue_size,
            });
        }
        Ok(())
    }
}

impl From<&BatchSpanProcessorConfig> for trace::BatchConfig {
    fn from(value: &BatchSpanProcessorConfig) -> Self {
        trace::BatchConfigBuilder::default()
            .with_max_queue_size(value.max_queue_size)
            .with_max_export_batch_size(value.max_export_batch_size)
            .with_scheduled_delay(value.schedule_delay)
            .build()
    }
}

/// Enables or disables the instrumentation of specific technologies. Everything is enabled by
/// default.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct InstrumentRuntimeConfig {
    #[serde(default = "enabled")]
    pub(crate) grpc: bool,
    #[serde(default = "enabled")]
    pub(crate) messaging: bool,
    #[serde(default = "enabled")]
    pub(crate) rest_client: bool,
    #[serde(default = "enabled")]
    pub(crate) rest: bool,
    #[serde(default = "enabled")]
    pub(crate) http_server: bool,
    #[serde(default = "enabled")]
    pub(crate) event_bus: bool,
    #[serde(default = "enabled")]
    pub(crate) sql_client: bool,
    #[serde(default = "enabled")]
    pub(crate) redis_client: bool,
}

fn enabled() -> bool {
    true
}

impl Default for InstrumentRuntimeConfig {
    fn default() -> Self {
        Self {
            grpc: true,
            messaging: true,
            rest_client: true,
            rest: true,
            http_server: true,
            event_bus: true,
            sql_client: true,
            redis_client: true,
        }
    }
}

impl InstrumentRuntimeConfig {
    pub fn grpc(&self) -> bool {
        self.grpc
    }

    pub fn messaging(&self) -> bool {
        self.messaging
    }

    pub fn rest_client(&self) -> bool {
        self.rest_client
    }

    pub fn rest(&self) -> bool {
        self.rest
    }

    pub fn http_server(&self) -> bool {
        self.http_server
    }

    pub fn event_bus(&self) -> bool {
        self.event_bus
    }

    pub fn sql_client(&self) -> bool {
        self.sql_client
    }

    pub fn redis_client(&self) -> bool {
        self.redis_client
    }
}
