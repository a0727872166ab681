//! Mock GCP services for integration tests
//!
//! Provides wiremock-based mocks for:
//! - the metadata server (project ID, default service account token)
//! - the Secret Manager REST API

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use gsm::{ClientConfig, SecretManagerClient};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const PROJECT: &str = "test-project";
pub const TOKEN: &str = "ya29.test-token";

pub const PROJECT_ID_PATH: &str = "/project/project-id";
pub const TOKEN_PATH: &str = "/instance/service-accounts/default/token";

/// One mock metadata server plus one mock Secret Manager API
pub struct GcpMocks {
    pub metadata: MockServer,
    pub api: MockServer,
}

impl GcpMocks {
    pub async fn start() -> Self {
        Self { metadata: MockServer::start().await, api: MockServer::start().await }
    }

    /// Client config pointed at the mocks, with a short retry delay
    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_metadata_url(self.metadata.uri())
            .with_api_url(self.api.uri())
            .with_retry_delay(Duration::from_millis(10))
    }

    pub fn client(&self) -> SecretManagerClient {
        SecretManagerClient::new(self.config()).expect("client builds")
    }

    /// Serve `body` as the project ID
    pub async fn mount_project_id(&self, body: &str) {
        Mock::given(method("GET"))
            .and(path(PROJECT_ID_PATH))
            .and(header("Metadata-Flavor", "Google"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.metadata)
            .await;
    }

    /// Serve `token` from the token endpoint
    pub async fn mount_token(&self, token: &str) {
        Mock::given(method("GET"))
            .and(path(TOKEN_PATH))
            .and(header("Metadata-Flavor", "Google"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": token,
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .mount(&self.metadata)
            .await;
    }

    /// Project ID and token both served
    pub async fn mount_identity(&self) {
        self.mount_project_id(PROJECT).await;
        self.mount_token(TOKEN).await;
    }

    pub async fn api_requests(&self) -> Vec<Request> {
        self.api.received_requests().await.unwrap_or_default()
    }

    pub async fn metadata_requests(&self) -> Vec<Request> {
        self.metadata.received_requests().await.unwrap_or_default()
    }
}

pub fn access_path(project: &str, name: &str) -> String {
    format!("/projects/{}/secrets/{}/versions/latest:access", project, name)
}

pub fn create_path(project: &str) -> String {
    format!("/projects/{}/secrets", project)
}

pub fn add_version_path(project: &str, name: &str) -> String {
    format!("/projects/{}/secrets/{}:addVersion", project, name)
}

pub fn encode(plaintext: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(plaintext)
}

/// Access response for `plaintext`, shaped like the real API
pub fn access_body(project: &str, name: &str, plaintext: &[u8]) -> serde_json::Value {
    json!({
        "name": format!("projects/{}/secrets/{}/versions/1", project, name),
        "payload": { "data": encode(plaintext) }
    })
}

/// In-memory secret versions shared by the add-version and access responders
#[derive(Clone, Default)]
pub struct VersionStore {
    versions: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl VersionStore {
    pub fn version_count(&self, name: &str) -> usize {
        self.versions.lock().unwrap().get(name).map(Vec::len).unwrap_or(0)
    }

    /// Mount create, add-version and access endpoints for `project`
    pub async fn mount(&self, server: &MockServer, project: &str) {
        Mock::given(method("POST"))
            .and(path(create_path(project)))
            .respond_with(CreateResponder(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(wiremock::matchers::path_regex(format!(
                r"^/projects/{}/secrets/[^/]+:addVersion$",
                project
            )))
            .respond_with(AddVersionResponder(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::path_regex(format!(
                r"^/projects/{}/secrets/[^/]+/versions/latest:access$",
                project
            )))
            .respond_with(AccessResponder(self.clone()))
            .mount(server)
            .await;
    }
}

fn secret_name(request: &Request) -> String {
    let path = request.url.path();
    let rest = path.split("/secrets/").nth(1).unwrap_or_default();
    rest.split(['/', ':']).next().unwrap_or_default().to_string()
}

struct CreateResponder(VersionStore);

impl Respond for CreateResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let name = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "secretId")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        let mut versions = self.0.versions.lock().unwrap();
        if versions.contains_key(&name) {
            return ResponseTemplate::new(409)
                .set_body_json(json!({"error": {"code": 409, "status": "ALREADY_EXISTS"}}));
        }
        versions.insert(name.clone(), Vec::new());
        ResponseTemplate::new(200).set_body_json(json!({ "name": name }))
    }
}

struct AddVersionResponder(VersionStore);

impl Respond for AddVersionResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let name = secret_name(request);
        let body: serde_json::Value = match request.body_json() {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let data = body["payload"]["data"].as_str().unwrap_or_default().to_string();

        let mut versions = self.0.versions.lock().unwrap();
        match versions.get_mut(&name) {
            Some(list) => {
                list.push(data);
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "name": format!("{}/versions/{}", name, list.len()) }))
            }
            None => ResponseTemplate::new(404),
        }
    }
}

struct AccessResponder(VersionStore);

impl Respond for AccessResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let name = secret_name(request);
        let versions = self.0.versions.lock().unwrap();
        match versions.get(&name).and_then(|list| list.last()) {
            Some(data) => ResponseTemplate::new(200).set_body_json(json!({ "payload": { "data": data } })),
            None => ResponseTemplate::new(404),
        }
    }
}
