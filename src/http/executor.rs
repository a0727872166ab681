//! Retrying HTTP executor.
//!
//! Each call runs as a small state machine: an attempt produces an
//! [`Attempt`] (success, retryable failure or terminal failure); retryable
//! failures loop back after a fixed, cancellable delay until the attempt cap
//! is reached. The call context is checked before every attempt and raced
//! against every request and every wait, and its error always wins over a
//! remembered retryable one.

use bytes::Bytes;
use reqwest::{Client, Method, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::body::{read_capped, CappedBody};
use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::errors::{AttemptError, Phase, Result, SecretsError};
use crate::secrets::SecretString;

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    /// Done; stop retrying and return the value
    Success(T),
    /// Worth another try if attempts remain
    Retryable(AttemptError),
    /// Stop immediately and surface this error
    Terminal(SecretsError),
}

impl<T> Attempt<T> {
    /// Classify a status that is not the call's success status.
    ///
    /// 4xx is terminal; anything else (5xx, unexpected 1xx/2xx/3xx) is retried.
    pub fn unexpected_status(phase: Phase, status: StatusCode, body: &[u8]) -> Self {
        if status.is_client_error() {
            Attempt::Terminal(SecretsError::from_client_status(phase, status.as_u16(), body))
        } else {
            Attempt::Retryable(AttemptError::Status {
                status: status.as_u16(),
                body: crate::errors::body_excerpt(body),
            })
        }
    }
}

/// Fixed-delay retry policy shared by every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl From<&ClientConfig> for RetryPolicy {
    fn from(config: &ClientConfig) -> Self {
        Self { max_attempts: config.max_attempts, retry_delay: config.retry_delay }
    }
}

/// The request shape of one call; rebuilt into a fresh request per attempt.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    url: String,
    headers: Vec<(&'static str, &'static str)>,
    bearer: Option<SecretString>,
    body: Option<Bytes>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), bearer: None, body: None }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn bearer(mut self, token: &SecretString) -> Self {
        self.bearer = Some(token.clone());
        self
    }

    /// Attach a JSON body and the matching content type.
    pub fn json_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(Bytes::from(body));
        self.header("Content-Type", "application/json")
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A received response, body already read through the size cap.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: CappedBody,
}

impl RawResponse {
    pub fn body(&self) -> &[u8] {
        self.body.as_slice()
    }
}

/// Issues requests and applies the retry policy.
///
/// Holds the pooled HTTP transport; safe to share across concurrent calls.
#[derive(Debug, Clone)]
pub struct Executor {
    client: Client,
    policy: RetryPolicy,
    max_body_size: usize,
}

impl Executor {
    /// Build an executor with its own connection pool from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SecretsError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, policy: RetryPolicy::from(config), max_body_size: config.max_body_size })
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    /// Generic retry driver.
    ///
    /// Runs `attempt` up to the attempt cap, waiting the fixed delay between
    /// attempts. Stops on the first success or terminal failure. Cancellation
    /// before or during an attempt or wait returns the context's error.
    pub async fn retry<T, F, Fut>(&self, ctx: &CallContext, phase: Phase, mut attempt: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Attempt<T>>,
    {
        let mut last_error = AttemptError::NoAttempts;

        for n in 0..self.policy.max_attempts {
            if n > 0 {
                info!(phase = phase.as_str(), attempt = n + 1, "retrying request");
                ctx.sleep(self.policy.retry_delay).await.map_err(|i| i.into_error(phase))?;
            }

            if let Some(interrupt) = ctx.check() {
                return Err(interrupt.into_error(phase));
            }

            match ctx.run(attempt(n)).await.map_err(|i| i.into_error(phase))? {
                Attempt::Success(value) => return Ok(value),
                Attempt::Terminal(err) => {
                    error!(phase = phase.as_str(), attempt = n + 1, error = %err, "request failed");
                    return Err(err);
                }
                Attempt::Retryable(cause) => {
                    warn!(phase = phase.as_str(), attempt = n + 1, error = %cause, "attempt failed");
                    last_error = cause;
                }
            }
        }

        Err(SecretsError::exhausted(phase, self.policy.max_attempts, last_error))
    }

    /// Send `request` through the retry driver, decoding each response with
    /// `decode`. Transport failures are retried; bodies are always read to
    /// EOF (or the cap) before `decode` sees them. A truncated body on a
    /// non-4xx status is retried without being decoded.
    pub async fn execute<T, D>(
        &self,
        ctx: &CallContext,
        phase: Phase,
        request: &RequestSpec,
        decode: D,
    ) -> Result<T>
    where
        D: Fn(RawResponse) -> Attempt<T>,
    {
        let decode = &decode;
        self.retry(ctx, phase, move |_| async move {
            let response = match self.send_once(request).await {
                Ok(response) => response,
                Err(e) if e.is_builder() => {
                    return Attempt::Terminal(SecretsError::config(format!(
                        "{}: invalid request: {}",
                        phase, e
                    )));
                }
                Err(e) => return Attempt::Retryable(e.into()),
            };

            let status = response.status();
            debug!(phase = phase.as_str(), status = status.as_u16(), "received response");

            let body = match read_capped(response, self.max_body_size).await {
                Ok(body) => body,
                // The status alone decides a 4xx; the body only feeds the message
                Err(_) if status.is_client_error() => CappedBody::default(),
                Err(e) => return Attempt::Retryable(e.into()),
            };

            // A cut-off body must never decode into a plausible value
            if body.truncated && !status.is_client_error() {
                return Attempt::Retryable(AttemptError::Truncated { cap: self.max_body_size });
            }

            decode(RawResponse { status, body })
        })
        .await
    }

    async fn send_once(&self, request: &RequestSpec) -> std::result::Result<reqwest::Response, reqwest::Error> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(*name, *value);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        builder.send().await
    }
}
