use super::config::{OTelConfigError, OTelRuntimeConfig};
use super::resource::build_resource;
use crate::defaults::TRACER_NAME;
use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::trace::{BatchSpanProcessor, SdkTracer, SdkTracerProvider, SpanExporter};
use std::time::Duration;
use tracing::{debug, error};

/// Holds the OpenTelemetry SDK built from an [OTelRuntimeConfig].
pub struct TelemetrySdk {
    tracer_provider: SdkTracerProvider,
    shutdown_wait_time: Duration,
}

impl TelemetrySdk {
    /// Builds the tracer provider corresponding to the provided configuration, exporting spans
    /// through a batch span processor tuned by the `bsp` settings.
    ///
    /// Returns `None` when the SDK is disabled, in that case nothing else in the configuration is
    /// considered.
    pub fn try_new<E>(config: &OTelRuntimeConfig, exporter: E) -> Result<Option<Self>, OTelConfigError>
    where
        E: SpanExporter + 'static,
    {
        if config.sdk_disabled() {
            debug!("OpenTelemetry SDK is disabled, skipping initialization");
            return Ok(None);
        }

        let batch_processor = BatchSpanProcessor::builder(exporter)
            .with_batch_config(config.bsp().into())
            .build();

        let tracer_provider = SdkTracerProvider::builder()
            .with_span_processor(batch_processor)
            .with_sampler(config.traces().to_sampler())
            .with_span_limits(config.span_limits())
            .with_resource(build_resource(config)?)
            .build();

        debug!(
            service_name = config.service_name(),
            sampler = %config.traces().sampler(),
            "OpenTelemetry SDK initialized"
        );

        Ok(Some(Self {
            tracer_provider,
            shutdown_wait_time: config.experimental_shutdown_wait_time(),
        }))
    }

    pub fn tracer_provider(&self) -> &SdkTracerProvider {
        &self.tracer_provider
    }

    pub fn tracer(&self) -> SdkTracer {
        self.tracer_provider.tracer(TRACER_NAME)
    }

    /// Sets the tracer provider as global, check [opentelemetry::global] for details.
    pub fn set_global(&self) {
        global::set_tracer_provider(self.tracer_provider.clone());
    }

    /// Flushes pending spans and shuts the SDK down, waiting at most the configured shutdown wait
    /// time. Failures are logged and never propagated, they must not prevent the process from
    /// stopping.
    pub fn shutdown(self) {
        if let Err(err) = self
            .tracer_provider
            .shutdown_with_timeout(self.shutdown_wait_time)
        {
            error!(%err, "error shutting down the OpenTelemetry SDK");
        }
    }
}
