//! # Configuration Settings
//!
//! Defines the configuration held by a secret manager client: endpoint base
//! URLs, the retry policy, the response body cap and transport tuning.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::{Validate, ValidationError};

use crate::errors::{Result, SecretsError};

/// Default metadata server base URL (only reachable over plain HTTP)
pub const DEFAULT_METADATA_URL: &str = "http://metadata.google.internal/computeMetadata/v1";

/// Default Secret Manager REST API base URL
pub const DEFAULT_API_URL: &str = "https://secretmanager.googleapis.com/v1";

/// Default fixed delay between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Default number of attempts per call, the first one included
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default response body cap (10 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default idle keep-alive connections kept per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 2;

/// Idle connection cap across all hosts. Not enforced: reqwest only limits
/// idle connections per host.
pub const POOL_MAX_IDLE_TOTAL: usize = 10;

/// Default lifetime of an idle pooled connection
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    /// Metadata server base URL, without trailing slash
    #[validate(custom(function = "validate_base_url"))]
    pub metadata_url: String,

    /// Secret Manager API base URL, without trailing slash
    #[validate(custom(function = "validate_base_url"))]
    pub api_url: String,

    /// Fixed wait between attempts (no backoff, no jitter)
    pub retry_delay: Duration,

    /// Attempts per call, including the first
    #[validate(range(min = 1, max = 100, message = "Max attempts must be between 1 and 100"))]
    pub max_attempts: u32,

    /// Bytes read from any response body before truncation
    #[validate(range(min = 1, message = "Max body size must be at least 1 byte"))]
    pub max_body_size: usize,

    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,

    /// Idle keep-alive connections kept per host
    pub pool_max_idle_per_host: usize,

    /// How long an idle pooled connection is kept
    pub pool_idle_timeout: Duration,

    /// User-Agent sent on every request
    #[validate(length(min = 1, message = "User agent cannot be empty"))]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            user_agent: format!("{}/{}", crate::APP_NAME, crate::VERSION),
        }
    }
}

impl ClientConfig {
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = trim_base_url(url.into());
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = trim_base_url(url.into());
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(|e| SecretsError::config(e.to_string()))
    }
}

/// Strip trailing slashes so paths can be appended with `format!`.
pub(crate) fn trim_base_url(url: String) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.len() == url.len() {
        url
    } else {
        trimmed.to_string()
    }
}

fn validate_base_url(value: &str) -> std::result::Result<(), ValidationError> {
    let url = Url::parse(value).map_err(|_| ValidationError::new("invalid_base_url"))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ValidationError::new("unsupported_base_url"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ValidationError::new("base_url_has_query"));
    }
    Ok(())
}
