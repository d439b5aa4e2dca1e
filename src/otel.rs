//! OpenTelemetry runtime configuration and the tools to bootstrap the SDK from it.
//!
pub mod config;
pub mod resource;
pub mod sampler;
pub mod sdk;
pub mod semconv;
