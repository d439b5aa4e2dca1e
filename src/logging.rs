//! Console logging of the runtime configuration tools.
pub mod config;
pub mod format;
