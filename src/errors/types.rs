//! # Error Types
//!
//! Error types for secret access and storage using `thiserror`.
//!
//! Every error carries the [`Phase`] it happened in, so the rendered message
//! always starts with the phase prefix (e.g. "failed to access secret: ...").

use std::fmt;

/// Custom result type for secret manager operations
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Maximum number of body bytes carried into an error message.
pub const ERROR_BODY_EXCERPT: usize = 512;

/// The sub-call of a top-level operation an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    ProjectId,
    AccessToken,
    AccessSecret,
    CreateSecret,
    AddVersion,
}

impl Phase {
    /// Short, stable name used as a structured logging field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::ProjectId => "project_id",
            Phase::AccessToken => "access_token",
            Phase::AccessSecret => "access_secret",
            Phase::CreateSecret => "create_secret",
            Phase::AddVersion => "add_version",
        }
    }

    /// Whether this phase talks to the metadata server rather than the API.
    pub fn is_metadata(&self) -> bool {
        matches!(self, Phase::ProjectId | Phase::AccessToken)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::ProjectId => write!(f, "failed to get project ID"),
            Phase::AccessToken => write!(f, "failed to get access token"),
            Phase::AccessSecret => write!(f, "failed to access secret"),
            Phase::CreateSecret => write!(f, "failed to create secret"),
            Phase::AddVersion => write!(f, "failed to add secret version"),
        }
    }
}

/// Coarse classification of a [`SecretsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    AuthFailure,
    PermissionDenied,
    NotFound,
    ClientError,
    TransientFailure,
    Cancelled,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "invalid_argument"),
            ErrorKind::AuthFailure => write!(f, "auth_failure"),
            ErrorKind::PermissionDenied => write!(f, "permission_denied"),
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::ClientError => write!(f, "client_error"),
            ErrorKind::TransientFailure => write!(f, "transient_failure"),
            ErrorKind::Cancelled => write!(f, "cancelled"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

/// The cause of a single failed attempt.
///
/// These are retryable by construction; terminal outcomes are reported
/// directly as a [`SecretsError`].
#[derive(thiserror::Error, Debug)]
pub enum AttemptError {
    /// DNS, connect, TLS, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status that is worth retrying (5xx and friends)
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    /// The body hit the size cap; whatever was read is incomplete
    #[error("response body exceeded {cap} bytes")]
    Truncated { cap: usize },

    /// Success status but the expected value was empty
    #[error("empty {0}")]
    Empty(&'static str),

    /// Success status but the body did not decode (possibly truncated)
    #[error("failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    /// Secret payload was not valid base64
    #[error("failed to decode secret data: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The retry loop ended without running a single attempt
    #[error("no attempts were made")]
    NoAttempts,
}

/// Main error type for secret manager operations
#[derive(thiserror::Error, Debug)]
pub enum SecretsError {
    /// Project ID or secret name failed syntax validation; no request was sent
    #[error("invalid {field} format: {value:?}")]
    InvalidArgument { field: &'static str, value: String },

    /// Metadata server lookups exhausted their attempts
    #[error("{phase}: {cause}")]
    AuthFailure {
        phase: Phase,
        #[source]
        cause: AttemptError,
    },

    /// 401 or 403
    #[error("{phase}: permission denied (status {status}): {body}")]
    PermissionDenied { phase: Phase, status: u16, body: String },

    /// 404
    #[error("{phase}: not found (status 404): {body}")]
    NotFound { phase: Phase, body: String },

    /// Any other 4xx
    #[error("{phase}: status {status}: {body}")]
    ClientError { phase: Phase, status: u16, body: String },

    /// Retryable failures exhausted the attempt cap
    #[error("{phase}: {cause} (after {attempts} attempts)")]
    Transient {
        phase: Phase,
        attempts: u32,
        #[source]
        cause: AttemptError,
    },

    /// The caller cancelled the call context
    #[error("{phase}: operation cancelled")]
    Cancelled { phase: Phase },

    /// The call context's deadline passed
    #[error("{phase}: deadline exceeded")]
    DeadlineExceeded { phase: Phase },

    /// Invalid client configuration
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SecretsError {
    /// Create an invalid argument error for the named field
    pub fn invalid_argument(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidArgument { field, value: value.into() }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into() }
    }

    /// Map a terminal 4xx status to its error variant.
    pub fn from_client_status(phase: Phase, status: u16, body: &[u8]) -> Self {
        let body = body_excerpt(body);
        match status {
            401 | 403 => Self::PermissionDenied { phase, status, body },
            404 => Self::NotFound { phase, body },
            _ => Self::ClientError { phase, status, body },
        }
    }

    /// Wrap the last attempt's cause once the attempt cap is reached.
    pub fn exhausted(phase: Phase, attempts: u32, cause: AttemptError) -> Self {
        if phase.is_metadata() {
            Self::AuthFailure { phase, cause }
        } else {
            Self::Transient { phase, attempts, cause }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::AuthFailure { .. } => ErrorKind::AuthFailure,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ClientError { .. } => ErrorKind::ClientError,
            Self::Transient { .. } => ErrorKind::TransientFailure,
            Self::Cancelled { .. } | Self::DeadlineExceeded { .. } => ErrorKind::Cancelled,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// The phase this error was raised in, if it came from a network phase.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::AuthFailure { phase, .. }
            | Self::PermissionDenied { phase, .. }
            | Self::NotFound { phase, .. }
            | Self::ClientError { phase, .. }
            | Self::Transient { phase, .. }
            | Self::Cancelled { phase }
            | Self::DeadlineExceeded { phase } => Some(*phase),
            Self::InvalidArgument { .. } | Self::Config { .. } => None,
        }
    }

    /// Whether calling the operation again may succeed without changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. } | Self::AuthFailure { .. })
    }

    /// Whether the error came from the call context rather than the service.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. } | Self::DeadlineExceeded { .. })
    }
}

/// Lossy UTF-8 excerpt of a response body, capped at [`ERROR_BODY_EXCERPT`].
pub fn body_excerpt(body: &[u8]) -> String {
    let end = body.len().min(ERROR_BODY_EXCERPT);
    String::from_utf8_lossy(&body[..end]).trim().to_string()
}
