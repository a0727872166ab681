//! # Error Handling
//!
//! Error types for the secret manager client, built on `thiserror`.

pub mod types;

pub use types::{body_excerpt, AttemptError, ErrorKind, Phase, Result, SecretsError};
