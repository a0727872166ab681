//! # Configuration Management
//!
//! Client configuration with defaults matching the production endpoints and
//! optional overrides from environment variables:
//!
//! - `GCE_METADATA_HOST` - metadata server host (or host:port)
//! - `GSM_METADATA_URL` - full metadata base URL (wins over `GCE_METADATA_HOST`)
//! - `GSM_API_URL` - Secret Manager API base URL
//! - `GSM_RETRY_DELAY_MS` - fixed delay between attempts in milliseconds
//! - `GSM_MAX_ATTEMPTS` - attempts per call
//! - `GSM_REQUEST_TIMEOUT_SECS` - per-request timeout in seconds

pub mod settings;

pub use settings::{
    ClientConfig, DEFAULT_API_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BODY_SIZE,
    DEFAULT_METADATA_URL, DEFAULT_POOL_IDLE_TIMEOUT, DEFAULT_POOL_MAX_IDLE_PER_HOST,
    DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_DELAY, POOL_MAX_IDLE_TOTAL,
};

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{Result, SecretsError};

impl ClientConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("GCE_METADATA_HOST").filter(|h| !h.is_empty()) {
            config = config.with_metadata_url(format!("http://{}/computeMetadata/v1", host));
        }
        if let Some(url) = lookup("GSM_METADATA_URL").filter(|u| !u.is_empty()) {
            config = config.with_metadata_url(url);
        }
        if let Some(url) = lookup("GSM_API_URL").filter(|u| !u.is_empty()) {
            config = config.with_api_url(url);
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "GSM_RETRY_DELAY_MS")? {
            config = config.with_retry_delay(Duration::from_millis(ms));
        }
        if let Some(attempts) = parse_var::<u32>(&lookup, "GSM_MAX_ATTEMPTS")? {
            config = config.with_max_attempts(attempts);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "GSM_REQUEST_TIMEOUT_SECS")? {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| SecretsError::config(format!("Invalid {}: {}", key, e))),
    }
}
