// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an Ollama-compatible inference server.
//!
//! Provides [`OllamaClient`] which knows the configured base addresses,
//! remembers the one that last answered a health check, and maps transport
//! failures onto the [`LumenError`] environment variants. Every request
//! carries its own timeout and is attempted exactly once.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use lumen_config::model::ServerConfig;
use lumen_core::error::LumenError;
use lumen_core::traits::{GenerationBackend, PluginAdapter};
use lumen_core::types::GenerateRequest;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{GenerateBody, GenerateResponse, TagsResponse, VersionResponse};

const VERSION_PATH: &str = "/api/version";
const TAGS_PATH: &str = "/api/tags";
const GENERATE_PATH: &str = "/api/generate";

/// Longest error body kept in an `HttpStatus` error.
const MAX_ERROR_BODY: usize = 512;

/// HTTP client shared by the catalog, the prober and the generation backend.
///
/// Cloning is cheap and clones share the active base address.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_urls: Arc<Vec<String>>,
    active: Arc<RwLock<String>>,
}

impl OllamaClient {
    /// Creates a client for the given base addresses, in probing order.
    pub fn new(base_urls: Vec<String>) -> Result<Self, LumenError> {
        let base_urls: Vec<String> = base_urls
            .into_iter()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .collect();
        let first = base_urls
            .first()
            .cloned()
            .ok_or_else(|| LumenError::Config("at least one server address is required".into()))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LumenError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_urls: Arc::new(base_urls),
            active: Arc::new(RwLock::new(first)),
        })
    }

    /// Creates a client for every host in the server section.
    pub fn from_config(server: &ServerConfig) -> Result<Self, LumenError> {
        Self::new(server.base_urls())
    }

    /// All configured base addresses, in probing order.
    pub fn base_urls(&self) -> &[String] {
        &self.base_urls
    }

    /// The address used for catalog and generation calls.
    pub fn active_base_url(&self) -> String {
        self.active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Records the address that most recently answered a health check.
    pub fn set_active_base_url(&self, base: &str) {
        let mut active = self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *active != base {
            debug!(endpoint = %base, "switching active server address");
            *active = base.to_string();
        }
    }

    /// `GET /api/version` against one address. Any 2xx is success.
    ///
    /// Returns the version string when the server reports one.
    pub async fn server_version(
        &self,
        base: &str,
        timeout: Duration,
    ) -> Result<Option<String>, LumenError> {
        let url = format!("{base}{VERSION_PATH}");
        let response = self
            .http
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &url, timeout))?;
        let response = ensure_success(response).await?;
        // The body is informational only.
        let version = response
            .json::<VersionResponse>()
            .await
            .ok()
            .and_then(|v| v.version);
        Ok(version)
    }

    /// `GET /api/tags` against the active address.
    pub async fn tags(&self, timeout: Duration) -> Result<Vec<String>, LumenError> {
        let url = format!("{}{TAGS_PATH}", self.active_base_url());
        let response = self
            .http
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &url, timeout))?;
        let tags: TagsResponse = decode(ensure_success(response).await?, &url, timeout).await?;
        Ok(tags.into_names())
    }

    /// `POST /api/generate` with `stream = false` against the active address.
    pub async fn generate_text(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<String, LumenError> {
        let url = format!("{}{GENERATE_PATH}", self.active_base_url());
        let body = GenerateBody {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            num_predict: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(model = %request.model, endpoint = %url, "sending generation request");
        let response = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &url, timeout))?;

        let reply: GenerateResponse =
            decode(ensure_success(response).await?, &url, timeout).await?;

        if let Some(error) = reply.error {
            return Err(LumenError::protocol(format!("server reported: {error}")));
        }
        reply
            .response
            .ok_or_else(|| LumenError::protocol("generation response has no `response` field"))
    }
}

impl PluginAdapter for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl GenerationBackend for OllamaClient {
    async fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<String, LumenError> {
        self.generate_text(request, timeout).await
    }
}

/// Converts a non-2xx response into `HttpStatus`.
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LumenError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    Err(LumenError::HttpStatus {
        status: status.as_u16(),
        body,
    })
}

/// Reads and parses a JSON body; a body that stalls past the deadline is a timeout.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    url: &str,
    timeout: Duration,
) -> Result<T, LumenError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| map_transport_error(e, url, timeout))?;
    serde_json::from_slice(&bytes).map_err(|e| LumenError::Protocol {
        message: format!("malformed JSON from {url}: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Maps a reqwest failure onto the environment error variants.
fn map_transport_error(err: reqwest::Error, url: &str, timeout: Duration) -> LumenError {
    if err.is_timeout() {
        LumenError::Timeout {
            duration: timeout,
            source: Some(Box::new(err)),
        }
    } else if err.is_connect() {
        LumenError::Unreachable {
            endpoint: url.to_string(),
            source: Some(Box::new(err)),
        }
    } else if let Some(status) = err.status() {
        LumenError::HttpStatus {
            status: status.as_u16(),
            body: String::new(),
        }
    } else {
        LumenError::Protocol {
            message: format!("request to {url} failed: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(model: &str) -> GenerateRequest {
        GenerateRequest {
            model: model.into(),
            prompt: "Why is the sky blue?".into(),
            max_tokens: 100,
            temperature: 0.7,
        }
    }

    /// Address of a loopback port with nothing listening on it.
    fn unused_base_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("http://127.0.0.1:{port}")
    }

    #[test]
    fn new_requires_an_address() {
        assert!(matches!(
            OllamaClient::new(vec![]),
            Err(LumenError::Config(_))
        ));
    }

    #[test]
    fn first_address_is_active_by_default() {
        let client =
            OllamaClient::new(vec!["http://localhost:11434/".into(), "http://127.0.0.1:11434".into()])
                .unwrap();
        assert_eq!(client.active_base_url(), "http://localhost:11434");
        client.set_active_base_url("http://127.0.0.1:11434");
        assert_eq!(client.clone().active_base_url(), "http://127.0.0.1:11434");
    }

    #[tokio::test]
    async fn generate_sends_non_streaming_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3:8b",
                "prompt": "Why is the sky blue?",
                "stream": false,
                "num_predict": 100
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "Rayleigh scattering.", "done": true})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(vec![server.uri()]).unwrap();
        let text = client
            .generate(&request("llama3:8b"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(text, "Rayleigh scattering.");
    }

    #[tokio::test]
    async fn generate_missing_response_field_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"done": true})))
            .mount(&server)
            .await;

        let client = OllamaClient::new(vec![server.uri()]).unwrap();
        let err = client
            .generate(&request("m"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, LumenError::Protocol { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn generate_in_band_error_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"error": "model not loaded"})),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(vec![server.uri()]).unwrap();
        let err = client
            .generate(&request("m"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("model not loaded"), "got: {err}");
    }

    #[tokio::test]
    async fn generate_non_2xx_is_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'm' not found"))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(vec![server.uri()]).unwrap();
        let err = client
            .generate(&request("m"), Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            LumenError::HttpStatus { status, body } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_slow_server_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = OllamaClient::new(vec![server.uri()]).unwrap();
        let err = client
            .generate(&request("m"), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "got: {err:?}");
    }

    #[tokio::test]
    async fn generate_refused_connection_is_unreachable() {
        let client = OllamaClient::new(vec![unused_base_url()]).unwrap();
        let err = client
            .generate(&request("m"), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, LumenError::Unreachable { .. }), "got: {err:?}");
    }

    #[tokio::test]
    async fn tags_lists_names_from_active_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "mistral:7b"}, {"name": "phi3:mini"}]
            })))
            .mount(&server)
            .await;

        let client = OllamaClient::new(vec![unused_base_url(), server.uri()]).unwrap();
        client.set_active_base_url(&server.uri());
        let names = client.tags(Duration::from_secs(2)).await.unwrap();
        assert_eq!(names, vec!["mistral:7b", "phi3:mini"]);
    }

    #[tokio::test]
    async fn version_accepts_any_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/version"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = OllamaClient::new(vec![server.uri()]).unwrap();
        let version = client
            .server_version(&server.uri(), Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(version, None);
    }
}
