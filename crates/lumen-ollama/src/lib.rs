// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters for an Ollama-compatible inference server.
//!
//! This crate implements [`ModelCatalog`](lumen_core::ModelCatalog),
//! [`AvailabilityProbe`](lumen_core::AvailabilityProbe) and
//! [`GenerationBackend`](lumen_core::GenerationBackend) over the server's
//! `/api/tags`, `/api/version` and `/api/generate` endpoints. All three share
//! one [`OllamaClient`], so the address that last passed a health check is
//! the one used for listing and generation.

pub mod catalog;
pub mod client;
pub mod probe;
pub mod registry;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use lumen_config::LumenConfig;
use lumen_core::error::LumenError;
use tracing::info;

pub use catalog::CatalogClient;
pub use client::OllamaClient;
pub use probe::AvailabilityProber;
pub use registry::ModelRegistry;

/// The three server adapters wired to one shared client.
#[derive(Clone)]
pub struct OllamaAdapters {
    pub client: Arc<OllamaClient>,
    pub catalog: Arc<CatalogClient>,
    pub prober: Arc<AvailabilityProber>,
}

impl OllamaAdapters {
    /// Builds the adapters from the `[server]`, `[catalog]` and `[probe]` sections.
    pub fn from_config(config: &LumenConfig) -> Result<Self, LumenError> {
        let client = OllamaClient::from_config(&config.server)?;
        info!(
            endpoints = ?client.base_urls(),
            "inference server adapters initialized"
        );
        Ok(Self::new(
            client,
            config.catalog.timeout(),
            config.probe.timeout(),
        ))
    }

    pub fn new(client: OllamaClient, catalog_timeout: Duration, probe_timeout: Duration) -> Self {
        Self {
            catalog: Arc::new(CatalogClient::new(client.clone(), catalog_timeout)),
            prober: Arc::new(AvailabilityProber::new(client.clone(), probe_timeout)),
            client: Arc::new(client),
        }
    }
}
