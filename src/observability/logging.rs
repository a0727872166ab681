//! # Structured Logging
//!
//! Installs a `tracing-subscriber` formatter for binaries embedding the
//! client. The library itself only emits `tracing` events; it never
//! installs a subscriber on its own.
//!
//! Output goes to stderr so that secret values printed on stdout stay
//! separate from log lines.

use tracing_subscriber::EnvFilter;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}

impl LoggingConfig {
    pub fn new(verbose: bool, json: bool) -> Self {
        let level = if verbose { "debug" } else { "info" };
        Self { level: level.to_string(), json }
    }

    /// `RUST_LOG` wins over the configured level.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already set elsewhere (e.g. by a
/// test harness); that case is not an error.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if config.json { builder.json().try_init() } else { builder.try_init() };
    result.is_ok()
}
