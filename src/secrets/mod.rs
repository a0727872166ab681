//! Secret access and storage against Google Cloud Secret Manager.
//!
//! The [`SecretManagerClient`] implements the four operations:
//! - **fetch_secret** / **fetch_secret_from_project**: read the latest version
//! - **store_secret** / **store_secret_in_project**: create the secret if
//!   needed and add a new version
//!
//! The [`SecretStore`] trait exposes the same operations for callers that
//! want to substitute another backend (or a test double).
//!
//! # Example
//!
//! ```rust,no_run
//! use gsm::{CallContext, ClientConfig, SecretManagerClient};
//! use std::time::Duration;
//!
//! # async fn run() -> gsm::Result<()> {
//! let client = SecretManagerClient::new(ClientConfig::default())?;
//! let ctx = CallContext::with_timeout(Duration::from_secs(10));
//!
//! client.store_secret(&ctx, "db_password", "hunter2").await?;
//! let value = client.fetch_secret(&ctx, "db_password").await?;
//! assert_eq!(value.expose_str(), Some("hunter2"));
//! # Ok(())
//! # }
//! ```
//!
//! # Security Considerations
//!
//! - Secret values and access tokens are never logged
//! - Tokens are fetched per operation and never cached
//! - Payloads are zeroed in memory on drop

pub mod client;
pub mod types;
pub mod wire;

pub use client::{CreateOutcome, SecretManagerClient, SecretStore};
pub use types::{AccessToken, SecretPayload, SecretString};
