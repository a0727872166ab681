//! # Observability
//!
//! Logging setup for binaries. Library code reports through `tracing`
//! events with key-value fields (phase, attempt, status, error).

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
