//! Runtime configuration of the OIDC client filter and OpenTelemetry extensions: resolution from
//! YAML and environment sources, and bootstrap of the OpenTelemetry SDK from the result.
pub mod cli;
pub mod config;
pub mod defaults;
pub mod logging;
pub mod oidc_client_filter;
pub mod otel;
