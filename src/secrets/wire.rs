//! JSON envelopes exchanged with the metadata server and the Secret Manager API.

use base64::Engine;
use serde::{Deserialize, Serialize};

use super::types::SecretPayload;

/// `GET .../service-accounts/default/token`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
}

/// `GET .../versions/latest:access`
#[derive(Debug, Deserialize)]
pub struct AccessSecretVersionResponse {
    pub payload: PayloadData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayloadData {
    /// Base64 (standard alphabet, padded) encoding of the plaintext
    pub data: String,
}

impl PayloadData {
    pub fn encode(plaintext: &[u8]) -> Self {
        Self { data: base64::engine::general_purpose::STANDARD.encode(plaintext) }
    }

    pub fn decode(&self) -> Result<SecretPayload, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(&self.data).map(SecretPayload::new)
    }
}

/// `POST .../secrets?secretId={name}` body.
///
/// Replication is always automatic with no region constraints.
#[derive(Debug, Serialize)]
pub struct CreateSecretRequest {
    pub replication: Replication,
}

impl Default for CreateSecretRequest {
    fn default() -> Self {
        Self { replication: Replication { automatic: Automatic {} } }
    }
}

#[derive(Debug, Serialize)]
pub struct Replication {
    pub automatic: Automatic,
}

#[derive(Debug, Serialize)]
pub struct Automatic {}

/// `POST .../secrets/{name}:addVersion` body
#[derive(Debug, Serialize)]
pub struct AddSecretVersionRequest {
    pub payload: PayloadData,
}
