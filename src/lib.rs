//! # gsm
//!
//! A small Google Cloud Secret Manager client for workloads running on GCP
//! compute. Credentials and the project ID come from the instance metadata
//! server; secrets are read and written over the Secret Manager REST API.
//!
//! ## Architecture
//!
//! ```text
//! fetch/store ──► validation ──► metadata (project ID, token) ──► Secret Manager REST
//!                                        │                               │
//!                                        └──────── retrying executor ────┘
//! ```
//!
//! Every network call goes through one [`http::Executor`]: a bounded number
//! of attempts with a fixed delay, a byte-capped body read, and early exit on
//! cancellation or deadline via [`CallContext`].
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gsm::CallContext;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> gsm::Result<()> {
//!     let ctx = CallContext::with_timeout(Duration::from_secs(30));
//!     gsm::store_secret(&ctx, "api_key", "s3cr3t").await?;
//!     let value = gsm::fetch_secret(&ctx, "api_key").await?;
//!     assert_eq!(value.expose_str(), Some("s3cr3t"));
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod metadata;
pub mod observability;
pub mod secrets;
pub mod validation;

use once_cell::sync::OnceCell;

// Re-export commonly used types and traits
pub use config::ClientConfig;
pub use context::{CallContext, Interrupt};
pub use errors::{ErrorKind, Phase, Result, SecretsError};
pub use secrets::{SecretManagerClient, SecretPayload, SecretStore, SecretString};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

static DEFAULT_CLIENT: OnceCell<SecretManagerClient> = OnceCell::new();

/// Process-wide client built from the environment on first use.
///
/// A configuration error is returned to the caller and the next call tries
/// again.
pub fn default_client() -> Result<&'static SecretManagerClient> {
    DEFAULT_CLIENT.get_or_try_init(SecretManagerClient::from_env)
}

/// Fetch the latest version of `name` from the current project.
pub async fn fetch_secret(ctx: &CallContext, name: &str) -> Result<SecretPayload> {
    default_client()?.fetch_secret(ctx, name).await
}

/// Fetch the latest version of `name` from `project_id`.
pub async fn fetch_secret_from_project(
    ctx: &CallContext,
    project_id: &str,
    name: &str,
) -> Result<SecretPayload> {
    default_client()?.fetch_secret_from_project(ctx, project_id, name).await
}

/// Store `value` as a new version of `name` in the current project.
pub async fn store_secret(ctx: &CallContext, name: &str, value: impl AsRef<[u8]>) -> Result<()> {
    default_client()?.store_secret(ctx, name, value).await
}

/// Store `value` as a new version of `name` in `project_id`.
pub async fn store_secret_in_project(
    ctx: &CallContext,
    project_id: &str,
    name: &str,
    value: impl AsRef<[u8]>,
) -> Result<()> {
    default_client()?.store_secret_in_project(ctx, project_id, name, value).await
}
