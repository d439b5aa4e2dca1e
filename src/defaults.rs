use std::time::Duration;

pub const EXTENSION_RUNTIME_CONFIG_VERSION: &str = env!("CARGO_PKG_VERSION");

// Environment
pub const APPLICATION_CONFIG_ENV_VAR_PREFIX: &str = "APP";
pub const APPLICATION_CONFIG_ENV_VAR_SEPARATOR: &str = "__";

// Application
pub const UNSET_SERVICE_NAME: &str = "unset";

// OpenTelemetry
pub const SERVICE_NAME_RESOURCE_KEY: &str = "service.name";
pub const DEFAULT_SHUTDOWN_WAIT_TIME: Duration = Duration::from_secs(1);
pub const DEFAULT_ATTRIBUTE_COUNT_LIMIT: u32 = 128;
pub const DEFAULT_SPAN_ATTRIBUTE_COUNT_LIMIT: u32 = 128;
pub const DEFAULT_SPAN_EVENT_COUNT_LIMIT: u32 = 128;
pub const DEFAULT_SPAN_LINK_COUNT_LIMIT: u32 = 128;
pub const DEFAULT_BSP_SCHEDULE_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_BSP_MAX_QUEUE_SIZE: usize = 2048;
pub const DEFAULT_BSP_MAX_EXPORT_BATCH_SIZE: usize = 512;
pub const DEFAULT_BSP_EXPORT_TIMEOUT: Duration = Duration::from_secs(30);
pub const TRACER_NAME: &str = "extension-runtime-config";

// OIDC client filter
pub const DEFAULT_OIDC_CLIENT_ID: &str = "Default";
