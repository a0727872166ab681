//! Secret Manager client: fetch and store operations.
//!
//! Every operation runs strictly in order: validate inputs, resolve the
//! project ID (when not given), resolve an access token, then issue the
//! secret call(s) through the retrying executor. Tokens live only for the
//! duration of one operation.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use super::types::{AccessToken, SecretPayload};
use super::wire::{
    AccessSecretVersionResponse, AddSecretVersionRequest, CreateSecretRequest, PayloadData,
};
use crate::config::ClientConfig;
use crate::context::CallContext;
use crate::errors::{Phase, Result, SecretsError};
use crate::http::{Attempt, Executor, RawResponse, RequestSpec};
use crate::metadata::MetadataResolver;
use crate::validation::{ProjectId, SecretName};

/// Result of the create phase of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// 409 Conflict: the secret exists and only needs a new version
    AlreadyExists,
}

/// Read and write access to secrets, independent of the backend.
///
/// # Security
///
/// Implementations MUST NOT log secret values.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Latest version of `name` in the store's default project.
    async fn fetch(&self, ctx: &CallContext, name: &str) -> Result<SecretPayload>;

    /// Latest version of `name` in `project_id`.
    async fn fetch_from_project(
        &self,
        ctx: &CallContext,
        project_id: &str,
        name: &str,
    ) -> Result<SecretPayload>;

    /// Add `value` as the new latest version of `name`, creating it if needed.
    async fn store(&self, ctx: &CallContext, name: &str, value: &[u8]) -> Result<()>;

    /// Like [`SecretStore::store`], in `project_id`.
    async fn store_in_project(
        &self,
        ctx: &CallContext,
        project_id: &str,
        name: &str,
        value: &[u8],
    ) -> Result<()>;
}

/// Google Cloud Secret Manager over REST, authenticated via the metadata server.
///
/// Cheap to clone; clones share one connection pool. Safe for concurrent use.
#[derive(Debug, Clone)]
pub struct SecretManagerClient {
    config: ClientConfig,
    executor: Executor,
}

impl SecretManagerClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let executor = Executor::new(&config)?;
        Ok(Self { config, executor })
    }

    /// Build a client from `ClientConfig::from_env`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn metadata(&self) -> MetadataResolver<'_> {
        MetadataResolver::new(&self.executor, &self.config.metadata_url)
    }

    /// Fetch the latest version of `name` from the project this instance runs in.
    pub async fn fetch_secret(&self, ctx: &CallContext, name: &str) -> Result<SecretPayload> {
        SecretName::parse(name)?;
        let project_id = self.metadata().resolve_project_id(ctx).await?;
        self.fetch_secret_from_project(ctx, &project_id, name).await
    }

    /// Fetch the latest version of `name` from `project_id`.
    pub async fn fetch_secret_from_project(
        &self,
        ctx: &CallContext,
        project_id: &str,
        name: &str,
    ) -> Result<SecretPayload> {
        let project_id = ProjectId::parse(project_id)?;
        let name = SecretName::parse(name)?;
        let token = self.metadata().resolve_access_token(ctx).await?;

        let request = RequestSpec::get(format!(
            "{}/projects/{}/secrets/{}/versions/latest:access",
            self.config.api_url, project_id, name
        ))
        .bearer(&token);

        let payload =
            self.executor.execute(ctx, Phase::AccessSecret, &request, decode_secret_payload).await?;

        info!(project_id = %project_id, secret = %name, "secret accessed successfully");
        Ok(payload)
    }

    /// Store `value` as a new version of `name` in this instance's project.
    pub async fn store_secret(
        &self,
        ctx: &CallContext,
        name: &str,
        value: impl AsRef<[u8]>,
    ) -> Result<()> {
        SecretName::parse(name)?;
        let project_id = self.metadata().resolve_project_id(ctx).await?;
        self.store_secret_in_project(ctx, &project_id, name, value).await
    }

    /// Store `value` as a new version of `name` in `project_id`.
    ///
    /// Creates the secret first; an existing secret (409) is not an error.
    /// Not transactional: if the create succeeds and the version add fails,
    /// the secret is left without a version and the store should be retried.
    pub async fn store_secret_in_project(
        &self,
        ctx: &CallContext,
        project_id: &str,
        name: &str,
        value: impl AsRef<[u8]>,
    ) -> Result<()> {
        let project_id = ProjectId::parse(project_id)?;
        let name = SecretName::parse(name)?;
        let token = self.metadata().resolve_access_token(ctx).await?;

        match self.create_secret(ctx, &project_id, &name, &token).await? {
            CreateOutcome::Created => info!(secret = %name, "secret created successfully"),
            CreateOutcome::AlreadyExists => {
                info!(secret = %name, "secret already exists, adding new version")
            }
        }

        self.add_version(ctx, &project_id, &name, &token, value.as_ref()).await
    }

    async fn create_secret(
        &self,
        ctx: &CallContext,
        project_id: &ProjectId,
        name: &SecretName,
        token: &AccessToken,
    ) -> Result<CreateOutcome> {
        let body = serde_json::to_vec(&CreateSecretRequest::default())
            .map_err(|e| SecretsError::config(format!("{}: {}", Phase::CreateSecret, e)))?;

        let request = RequestSpec::post(format!(
            "{}/projects/{}/secrets?secretId={}",
            self.config.api_url, project_id, name
        ))
        .bearer(token)
        .json_body(body);

        self.executor.execute(ctx, Phase::CreateSecret, &request, decode_create_outcome).await
    }

    async fn add_version(
        &self,
        ctx: &CallContext,
        project_id: &ProjectId,
        name: &SecretName,
        token: &AccessToken,
        value: &[u8],
    ) -> Result<()> {
        let body = serde_json::to_vec(&AddSecretVersionRequest { payload: PayloadData::encode(value) })
            .map_err(|e| SecretsError::config(format!("{}: {}", Phase::AddVersion, e)))?;

        let request = RequestSpec::post(format!(
            "{}/projects/{}/secrets/{}:addVersion",
            self.config.api_url, project_id, name
        ))
        .bearer(token)
        .json_body(body);

        let version =
            self.executor.execute(ctx, Phase::AddVersion, &request, decode_version_ack).await?;

        info!(
            secret = %name,
            version = version.as_deref().unwrap_or("unknown"),
            "secret version added successfully"
        );
        Ok(())
    }
}

#[async_trait]
impl SecretStore for SecretManagerClient {
    async fn fetch(&self, ctx: &CallContext, name: &str) -> Result<SecretPayload> {
        self.fetch_secret(ctx, name).await
    }

    async fn fetch_from_project(
        &self,
        ctx: &CallContext,
        project_id: &str,
        name: &str,
    ) -> Result<SecretPayload> {
        self.fetch_secret_from_project(ctx, project_id, name).await
    }

    async fn store(&self, ctx: &CallContext, name: &str, value: &[u8]) -> Result<()> {
        self.store_secret(ctx, name, value).await
    }

    async fn store_in_project(
        &self,
        ctx: &CallContext,
        project_id: &str,
        name: &str,
        value: &[u8],
    ) -> Result<()> {
        self.store_secret_in_project(ctx, project_id, name, value).await
    }
}

fn decode_secret_payload(response: RawResponse) -> Attempt<SecretPayload> {
    if response.status != StatusCode::OK {
        return Attempt::unexpected_status(Phase::AccessSecret, response.status, response.body());
    }

    // A truncated or garbled body fails here and is retried
    let envelope = match serde_json::from_slice::<AccessSecretVersionResponse>(response.body()) {
        Ok(envelope) => envelope,
        Err(e) => return Attempt::Retryable(e.into()),
    };

    match envelope.payload.decode() {
        Ok(payload) => Attempt::Success(payload),
        Err(e) => Attempt::Retryable(e.into()),
    }
}

fn decode_create_outcome(response: RawResponse) -> Attempt<CreateOutcome> {
    match response.status {
        StatusCode::OK | StatusCode::CREATED => Attempt::Success(CreateOutcome::Created),
        StatusCode::CONFLICT => {
            debug!(body = %crate::errors::body_excerpt(response.body()), "create returned conflict");
            Attempt::Success(CreateOutcome::AlreadyExists)
        }
        status => Attempt::unexpected_status(Phase::CreateSecret, status, response.body()),
    }
}

#[derive(Debug, Deserialize)]
struct SecretVersionAck {
    name: Option<String>,
}

/// The version is already committed once the API answers 200, so the ack
/// body is informational only and never triggers a retry.
fn decode_version_ack(response: RawResponse) -> Attempt<Option<String>> {
    if response.status != StatusCode::OK {
        return Attempt::unexpected_status(Phase::AddVersion, response.status, response.body());
    }
    let version = serde_json::from_slice::<SecretVersionAck>(response.body())
        .ok()
        .and_then(|ack| ack.name);
    Attempt::Success(version)
}
