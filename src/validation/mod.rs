//! # Validation Module
//!
//! Syntax checks for project IDs and secret names. Both run before any URL is
//! built or any request is sent; a failure is terminal and never retried.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

use crate::errors::{Result, SecretsError};

lazy_static! {
    /// Project IDs: lowercase letter first, 6-30 chars, no trailing hyphen
    static ref PROJECT_ID_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9-]{4,28}[a-z0-9]$")
        .expect("PROJECT_ID_REGEX should be a valid regex pattern");

    /// Secret names: alphanumeric, underscore, hyphen only (1-255 chars)
    static ref SECRET_NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_-]{1,255}$")
        .expect("SECRET_NAME_REGEX should be a valid regex pattern");
}

/// Check a project ID against the accepted syntax.
pub fn is_valid_project_id(candidate: &str) -> bool {
    PROJECT_ID_REGEX.is_match(candidate)
}

/// Check a secret name against the accepted syntax.
pub fn is_valid_secret_name(candidate: &str) -> bool {
    SECRET_NAME_REGEX.is_match(candidate)
}

/// A project ID that passed validation and is safe to place in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn parse(candidate: &str) -> Result<Self> {
        if !is_valid_project_id(candidate) {
            return Err(SecretsError::invalid_argument("project ID", candidate));
        }
        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A secret name that passed validation and is safe to place in a URL path
/// or query string without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretName(String);

impl SecretName {
    pub fn parse(candidate: &str) -> Result<Self> {
        if !is_valid_secret_name(candidate) {
            return Err(SecretsError::invalid_argument("secret name", candidate));
        }
        Ok(Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
