//! Redacting holders for secret material.
//!
//! Access tokens and secret payloads pass through logs, errors and debug
//! output as `[REDACTED]`, and their memory is zeroed on drop (`zeroize`).
//! The raw value is only reachable through an explicit `expose_*` call.

use serde::{Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Text secret such as a bearer access token.
///
/// Debug, Display and Serialize never show the value.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

/// Bearer token obtained from the metadata server for one operation.
pub type AccessToken = SecretString;

impl SecretString {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("[REDACTED]")
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Decoded plaintext of a secret version.
///
/// Secret Manager payloads are arbitrary bytes; most callers store UTF-8 text
/// and can use [`SecretPayload::expose_str`].
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretPayload(Vec<u8>);

impl SecretPayload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn expose_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The payload as text, if it is valid UTF-8.
    pub fn expose_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Convert into a [`SecretString`], replacing invalid UTF-8 sequences.
    pub fn to_secret_string(&self) -> SecretString {
        SecretString::new(String::from_utf8_lossy(&self.0).into_owned())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretPayload([REDACTED; {} bytes])", self.0.len())
    }
}

impl PartialEq for SecretPayload {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretPayload {}

impl From<Vec<u8>> for SecretPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&str> for SecretPayload {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_redacts() {
        let token = SecretString::new("ya29.super-secret");
        assert_eq!(format!("{:?}", token), "SecretString([REDACTED])");
        assert_eq!(format!("{}", token), "[REDACTED]");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"[REDACTED]\"");
        assert_eq!(token.expose_secret(), "ya29.super-secret");
    }

    #[test]
    fn test_secret_string_in_struct_json() {
        #[derive(Serialize)]
        struct Holder {
            project: String,
            token: SecretString,
        }

        let json = serde_json::to_string(&Holder {
            project: "my-project".to_string(),
            token: SecretString::new("hidden-token"),
        })
        .unwrap();

        assert!(json.contains("my-project"));
        assert!(!json.contains("hidden-token"));
    }

    #[test]
    fn test_payload_debug_shows_only_length() {
        let payload = SecretPayload::from("password123");
        let debug = format!("{:?}", payload);
        assert_eq!(debug, "SecretPayload([REDACTED; 11 bytes])");
        assert!(!debug.contains("password"));
    }

    #[test]
    fn test_payload_text_access() {
        let payload = SecretPayload::from("héllo");
        assert_eq!(payload.expose_str(), Some("héllo"));
        assert_eq!(payload.to_secret_string().expose_secret(), "héllo");

        let binary = SecretPayload::new(vec![0xff, 0xfe, 0x00]);
        assert_eq!(binary.expose_str(), None);
        assert_eq!(binary.expose_bytes(), &[0xff, 0xfe, 0x00]);
        assert_eq!(binary.len(), 3);
    }

    #[test]
    fn test_empty_values() {
        assert!(SecretString::default().is_empty());
        assert!(SecretPayload::default().is_empty());
    }
}
