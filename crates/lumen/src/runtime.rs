// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by every subcommand.

use std::sync::Arc;

use lumen_agent::{ChatOrchestrator, InferenceGateway};
use lumen_config::LumenConfig;
use lumen_core::LumenError;
use lumen_ollama::OllamaAdapters;
use tracing::{debug, info, warn};

/// Server adapters, gateway and orchestrator built from one configuration.
pub struct Runtime {
    pub config: LumenConfig,
    pub adapters: OllamaAdapters,
    pub gateway: Arc<InferenceGateway>,
    pub orchestrator: ChatOrchestrator,
}

impl Runtime {
    pub fn from_config(config: LumenConfig) -> Result<Self, LumenError> {
        let adapters = OllamaAdapters::from_config(&config)?;
        let gateway = Arc::new(InferenceGateway::from_config(
            &config,
            adapters.catalog.clone(),
            adapters.prober.clone(),
            adapters.client.clone(),
        ));
        let orchestrator = ChatOrchestrator::new(gateway.clone(), config.agent.max_tokens);
        Ok(Self {
            config,
            adapters,
            gateway,
            orchestrator,
        })
    }

    /// Starts gateway initialization in the background and waits for it at
    /// most the configured grace period.
    ///
    /// Returns the selected model if initialization finished in time.
    pub async fn initialize(&self) -> Option<String> {
        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            gateway.initialize().await;
        });

        let grace = self.config.gateway.init_grace();
        if tokio::time::timeout(grace, self.gateway.ready()).await.is_err() {
            warn!(
                grace_ms = grace.as_millis() as u64,
                "model initialization still pending"
            );
            return None;
        }
        let selected = self.gateway.selected_model();
        debug!(model = ?selected, "initialization finished");
        selected
    }

    /// Model for a new session: the selection, or the configured default.
    pub fn session_model(&self) -> String {
        self.gateway
            .selected_model()
            .unwrap_or_else(|| self.config.selection.default_model.clone())
    }

    /// Whether a new session would be bound to the configured default only
    /// because nothing has been selected yet.
    pub fn on_placeholder_model(&self) -> bool {
        self.gateway.selected_model().is_none()
    }

    /// Rebinds a session started on the placeholder model once the server
    /// lists models.
    ///
    /// Returns the adopted model, or `None` while the server is unreachable
    /// or lists nothing.
    pub async fn adopt_served_model(&self, session_id: &str) -> Result<Option<String>, LumenError> {
        let model = match self.gateway.selected_model() {
            Some(model) => model,
            None => {
                if !self.gateway.current_probe().await.is_reachable() {
                    return Ok(None);
                }
                match self.gateway.refresh_catalog().await {
                    Some(model) => model,
                    None => return Ok(None),
                }
            }
        };
        self.orchestrator.rebind_session(session_id, &model).await?;
        info!(session_id, model = %model, "session moved to served model");
        Ok(Some(model))
    }
}
