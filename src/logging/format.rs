use serde::Deserialize;

const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Represents a custom time stamp format for logging, based on
/// [chrono strftime](https://docs.rs/chrono/latest/chrono/format/strftime/index.html#fn7).
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub(crate) struct TimestampFormat(pub(crate) String);

impl Default for TimestampFormat {
    fn default() -> Self {
        Self(DEFAULT_TIMESTAMP_FORMAT.to_string())
    }
}

/// Defines the format to be used for logging.
///
/// # Fields:
/// - `target`: whether the target of the trace event is included in the formatted output.
/// - `timestamp`: the [TimestampFormat] used for log lines.
/// - `ansi_colors`: whether ansi colors are used in stdout logs.
#[derive(Debug, Deserialize, PartialEq, Clone, Default)]
pub struct LoggingFormat {
    #[serde(default)]
    pub(crate) target: bool,
    #[serde(default)]
    pub(crate) timestamp: TimestampFormat,
    #[serde(default)]
    pub(crate) ansi_colors: bool,
}
