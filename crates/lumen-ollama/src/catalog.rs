// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model catalog client.
//!
//! Lists the models the inference server reports. Listing never fails: any
//! network, status or decoding problem yields an empty list, the same answer
//! an absent server gives.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use lumen_core::traits::{ModelCatalog, PluginAdapter};
use tracing::{debug, info};

use crate::client::OllamaClient;
use crate::registry::ModelRegistry;

/// Fail-soft catalog over `GET /api/tags` with a cached last listing.
pub struct CatalogClient {
    client: OllamaClient,
    timeout: Duration,
    cache: RwLock<Vec<String>>,
    registry: Arc<ModelRegistry>,
}

impl CatalogClient {
    pub fn new(client: OllamaClient, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            cache: RwLock::new(Vec::new()),
            registry: Arc::new(ModelRegistry::new()),
        }
    }

    /// The registry kept in sync with successful listings.
    pub fn registry(&self) -> Arc<ModelRegistry> {
        Arc::clone(&self.registry)
    }
}

impl PluginAdapter for CatalogClient {
    fn name(&self) -> &str {
        "ollama-catalog"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl ModelCatalog for CatalogClient {
    async fn list_models(&self) -> Vec<String> {
        match self.client.tags(self.timeout).await {
            Ok(names) => {
                info!(count = names.len(), "model catalog refreshed");
                self.registry.sync_from_catalog(&names);
                *self
                    .cache
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = names.clone();
                names
            }
            Err(e) => {
                debug!(error = %e, "model listing failed, reporting empty catalog");
                Vec::new()
            }
        }
    }

    fn last_listing(&self) -> Vec<String> {
        self.cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog_for(uri: String) -> CatalogClient {
        CatalogClient::new(
            OllamaClient::new(vec![uri]).unwrap(),
            Duration::from_millis(500),
        )
    }

    #[tokio::test]
    async fn lists_names_and_caches_them() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [
                    {"name": "llama3:8b", "size": 4661224676u64},
                    {"model": "nameless"},
                    {"name": "mistral:7b"}
                ]
            })))
            .mount(&server)
            .await;

        let catalog = catalog_for(server.uri());
        assert!(catalog.last_listing().is_empty());

        let names = catalog.list_models().await;
        assert_eq!(names, vec!["llama3:8b", "mistral:7b"]);
        assert_eq!(catalog.last_listing(), names);
        assert_eq!(catalog.registry().loaded_models().len(), 2);
    }

    #[tokio::test]
    async fn malformed_json_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let catalog = catalog_for(server.uri());
        assert!(catalog.list_models().await.is_empty());
    }

    #[tokio::test]
    async fn server_error_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let catalog = catalog_for(server.uri());
        assert!(catalog.list_models().await.is_empty());
    }

    #[tokio::test]
    async fn slow_listing_yields_empty_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"models": [{"name": "late"}]}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let catalog = catalog_for(server.uri());
        assert!(catalog.list_models().await.is_empty());
    }

    #[tokio::test]
    async fn failed_listing_keeps_previous_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"models": [{"name": "phi3"}]})),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let catalog = catalog_for(server.uri());
        assert_eq!(catalog.list_models().await, vec!["phi3"]);
        assert!(catalog.list_models().await.is_empty());
        assert_eq!(catalog.last_listing(), vec!["phi3"]);
    }
}
