//! Metadata server lookups: project ID and default service account token.
//!
//! Both calls send `Metadata-Flavor: Google` and run through the shared
//! retry policy. Exhausting the attempts surfaces an auth failure wrapping
//! the last cause.

use reqwest::StatusCode;
use tracing::info;

use crate::context::CallContext;
use crate::errors::{AttemptError, Phase, Result};
use crate::http::{Attempt, Executor, RawResponse, RequestSpec};
use crate::secrets::wire::TokenResponse;
use crate::secrets::AccessToken;

pub const METADATA_FLAVOR_HEADER: &str = "Metadata-Flavor";
pub const METADATA_FLAVOR_VALUE: &str = "Google";

const PROJECT_ID_PATH: &str = "/project/project-id";
const TOKEN_PATH: &str = "/instance/service-accounts/default/token";

/// Resolves identity from the local metadata server.
#[derive(Debug, Clone, Copy)]
pub struct MetadataResolver<'a> {
    executor: &'a Executor,
    base_url: &'a str,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(executor: &'a Executor, base_url: &'a str) -> Self {
        Self { executor, base_url }
    }

    /// The current project's ID, whitespace-trimmed.
    pub async fn resolve_project_id(&self, ctx: &CallContext) -> Result<String> {
        let request = self.request(PROJECT_ID_PATH);
        let project_id =
            self.executor.execute(ctx, Phase::ProjectId, &request, decode_project_id).await?;

        info!(
            project_id = %project_id,
            length = project_id.len(),
            "fetched project ID from metadata server"
        );
        Ok(project_id)
    }

    /// A bearer token for the default service account.
    pub async fn resolve_access_token(&self, ctx: &CallContext) -> Result<AccessToken> {
        let request = self.request(TOKEN_PATH);
        self.executor.execute(ctx, Phase::AccessToken, &request, decode_access_token).await
    }

    fn request(&self, path: &str) -> RequestSpec {
        RequestSpec::get(format!("{}{}", self.base_url, path))
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE)
    }
}

fn decode_project_id(response: RawResponse) -> Attempt<String> {
    if response.status != StatusCode::OK {
        return Attempt::unexpected_status(Phase::ProjectId, response.status, response.body());
    }

    let text = String::from_utf8_lossy(response.body());
    let project_id = text.trim();
    if project_id.is_empty() {
        return Attempt::Retryable(AttemptError::Empty("project ID"));
    }
    Attempt::Success(project_id.to_string())
}

fn decode_access_token(response: RawResponse) -> Attempt<AccessToken> {
    if response.status != StatusCode::OK {
        return Attempt::unexpected_status(Phase::AccessToken, response.status, response.body());
    }

    match serde_json::from_slice::<TokenResponse>(response.body()) {
        Ok(token) if token.access_token.is_empty() => {
            Attempt::Retryable(AttemptError::Empty("access token"))
        }
        Ok(token) => Attempt::Success(AccessToken::new(token.access_token)),
        Err(e) => Attempt::Retryable(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SecretsError;
    use crate::http::CappedBody;
    use bytes::Bytes;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: CappedBody { bytes: Bytes::from(body.to_string()), truncated: false },
        }
    }

    #[test]
    fn test_project_id_is_trimmed() {
        match decode_project_id(response(200, "my-project\n")) {
            Attempt::Success(id) => assert_eq!(id, "my-project"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_blank_project_id_is_retryable() {
        assert!(matches!(
            decode_project_id(response(200, "   \n  ")),
            Attempt::Retryable(AttemptError::Empty("project ID"))
        ));
    }

    #[test]
    fn test_project_id_server_error_is_retryable() {
        assert!(matches!(decode_project_id(response(500, "")), Attempt::Retryable(_)));
    }

    #[test]
    fn test_project_id_forbidden_is_terminal() {
        assert!(matches!(
            decode_project_id(response(403, "Metadata-Flavor header required")),
            Attempt::Terminal(SecretsError::PermissionDenied { phase: Phase::ProjectId, .. })
        ));
    }

    #[test]
    fn test_token_decoding() {
        match decode_access_token(response(200, r#"{"access_token":"ya29.token","expires_in":3599}"#)) {
            Attempt::Success(token) => assert_eq!(token.expose_secret(), "ya29.token"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_token_is_retryable() {
        assert!(matches!(
            decode_access_token(response(200, r#"{"access_token":""}"#)),
            Attempt::Retryable(AttemptError::Empty("access token"))
        ));
    }

    #[test]
    fn test_garbled_token_is_retryable() {
        assert!(matches!(
            decode_access_token(response(200, r#"{"access_tok"#)),
            Attempt::Retryable(AttemptError::Json(_))
        ));
    }
}
