// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference gateway with offline fallback.
//!
//! One `infer` call runs these steps in order:
//! 1. wait (bounded) for an initialization already in progress
//! 2. probe the server, reusing a very recent report
//! 3. resolve a model: argument, current selection, first catalog entry
//! 4. one generation request with a generous timeout
//!
//! Any environment failure in steps 2 to 4 produces a mock reply instead of
//! an error. Only blank prompts, and timeouts when configured to propagate,
//! reach the caller as errors.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use lumen_config::LumenConfig;
use lumen_core::error::{require_non_blank, LumenError};
use lumen_core::traits::{AvailabilityProbe, GenerationBackend, InferenceService, ModelCatalog};
use lumen_core::types::{FallbackReason, GenerateRequest, InferenceReply, ProbeReport, ReplySource};
use lumen_router::ModelSelector;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::mock::MockResponder;

/// Host memory source used when ranking the catalog, in GB.
pub type MemorySource = Arc<dyn Fn() -> f64 + Send + Sync>;

/// Progress of [`InferenceGateway::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    NotStarted,
    Pending,
    Ready,
}

/// Timing and policy knobs for the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// Deadline for one generation call.
    pub generate_timeout: Duration,
    pub temperature: f32,
    /// Longest `infer` waits for [`InferenceGateway::initialize`] to finish.
    pub init_grace: Duration,
    /// A probe report younger than this is reused.
    pub probe_reuse_window: Duration,
    /// Return generation timeouts as errors instead of mock replies.
    pub propagate_timeouts: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::from_config(&LumenConfig::default())
    }
}

impl GatewaySettings {
    pub fn from_config(config: &LumenConfig) -> Self {
        Self {
            generate_timeout: config.gateway.timeout(),
            temperature: config.gateway.temperature,
            init_grace: config.gateway.init_grace(),
            probe_reuse_window: config.probe.reuse_window(),
            propagate_timeouts: config.gateway.propagate_timeouts,
        }
    }
}

/// Issues generation calls and applies the fallback policy.
pub struct InferenceGateway {
    catalog: Arc<dyn ModelCatalog>,
    probe: Arc<dyn AvailabilityProbe>,
    backend: Arc<dyn GenerationBackend>,
    selector: RwLock<ModelSelector>,
    mock: MockResponder,
    settings: GatewaySettings,
    memory: MemorySource,
    init: watch::Sender<InitState>,
}

impl InferenceGateway {
    /// Creates a gateway with the built-in selection table and an entropy-seeded mock.
    pub fn new(
        catalog: Arc<dyn ModelCatalog>,
        probe: Arc<dyn AvailabilityProbe>,
        backend: Arc<dyn GenerationBackend>,
        settings: GatewaySettings,
    ) -> Self {
        let (init, _) = watch::channel(InitState::NotStarted);
        Self {
            catalog,
            probe,
            backend,
            selector: RwLock::new(ModelSelector::from_config(&Default::default())),
            mock: MockResponder::new(),
            settings,
            memory: Arc::new(lumen_router::available_memory_gb),
            init,
        }
    }

    /// Creates a gateway configured from every relevant config section.
    pub fn from_config(
        config: &LumenConfig,
        catalog: Arc<dyn ModelCatalog>,
        probe: Arc<dyn AvailabilityProbe>,
        backend: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self::new(catalog, probe, backend, GatewaySettings::from_config(config))
            .with_selector(ModelSelector::from_config(&config.selection))
            .with_mock(MockResponder::from_seed_option(config.mock.seed))
    }

    pub fn with_selector(mut self, selector: ModelSelector) -> Self {
        self.selector = RwLock::new(selector);
        self
    }

    pub fn with_mock(mut self, mock: MockResponder) -> Self {
        self.mock = mock;
        self
    }

    /// Replaces host memory detection, e.g. with a constant in tests.
    pub fn with_memory_source(mut self, memory: MemorySource) -> Self {
        self.memory = memory;
        self
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    pub fn catalog(&self) -> &Arc<dyn ModelCatalog> {
        &self.catalog
    }

    pub fn probe(&self) -> &Arc<dyn AvailabilityProbe> {
        &self.probe
    }

    /// Refreshes the catalog, ranks it, and marks the gateway ready.
    ///
    /// Returns the selection afterwards. Safe to call again later to re-rank.
    pub async fn initialize(&self) -> Option<String> {
        self.init.send_if_modified(|state| {
            let start = *state == InitState::NotStarted;
            if start {
                *state = InitState::Pending;
            }
            start
        });
        let selected = self.refresh_catalog().await;
        self.init.send_replace(InitState::Ready);
        info!(model = ?selected, "inference gateway ready");
        selected
    }

    /// Lists models and re-runs selection against host memory.
    pub async fn refresh_catalog(&self) -> Option<String> {
        let models = self.catalog.list_models().await;
        let memory_gb = (self.memory)();
        let mut selector = self.selector_mut();
        selector.refresh(&models, memory_gb).map(str::to_string)
    }

    /// Resolves once [`initialize`](Self::initialize) has completed.
    pub async fn ready(&self) {
        let mut rx = self.init.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|state| *state == InitState::Ready).await;
    }

    pub fn init_state(&self) -> InitState {
        *self.init.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.init_state() == InitState::Ready
    }

    /// Pins `name` as the model used when `infer` gets no model argument.
    pub fn set_selected(&self, name: &str) -> Result<(), LumenError> {
        self.selector_mut().set_selected(name)
    }

    pub fn selected_model(&self) -> Option<String> {
        self.selector_ref().selected().map(str::to_string)
    }

    /// What the selector would pick from `catalog` with the host's current memory.
    pub fn rank(&self, catalog: &[String]) -> String {
        let memory_gb = (self.memory)();
        self.selector_ref().select_optimal(catalog, memory_gb)
    }

    /// A probe report younger than the reuse window, or a fresh one.
    pub async fn current_probe(&self) -> ProbeReport {
        if let Some(report) = self.probe.last_report() {
            if report.age() < self.settings.probe_reuse_window {
                debug!(state = %report.reachability, "reusing recent probe");
                return report;
            }
        }
        self.probe.probe_once().await
    }

    async fn wait_for_initialization(&self) {
        if self.init_state() != InitState::Pending {
            return;
        }
        if tokio::time::timeout(self.settings.init_grace, self.ready())
            .await
            .is_err()
        {
            debug!(
                grace_ms = self.settings.init_grace.as_millis() as u64,
                "initialization still pending, continuing"
            );
        }
    }

    /// Model for this call, or `None` when nothing is available.
    async fn resolve_model(&self, requested: &str) -> Option<String> {
        let requested = requested.trim();
        if !requested.is_empty() {
            return Some(requested.to_string());
        }
        if let Some(selected) = self.selected_model() {
            return Some(selected);
        }
        let models = self.catalog.list_models().await;
        let first = models.into_iter().next()?;
        self.selector_mut().adopt(&first);
        Some(first)
    }

    fn fallback(&self, prompt: &str, reason: FallbackReason) -> InferenceReply {
        warn!(reason = %reason, "answering with offline reply");
        InferenceReply {
            text: self.mock.reply(prompt),
            source: ReplySource::Fallback(reason),
        }
    }

    fn selector_ref(&self) -> std::sync::RwLockReadGuard<'_, ModelSelector> {
        self.selector
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn selector_mut(&self) -> std::sync::RwLockWriteGuard<'_, ModelSelector> {
        self.selector
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl InferenceService for InferenceGateway {
    async fn infer_detailed(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<InferenceReply, LumenError> {
        require_non_blank(prompt, "prompt")?;

        self.wait_for_initialization().await;

        let report = self.current_probe().await;
        if !report.is_reachable() {
            debug!(state = %report.reachability, "server not reachable");
            return Ok(self.fallback(prompt, FallbackReason::Unreachable));
        }

        let Some(model) = self.resolve_model(model).await else {
            return Ok(self.fallback(prompt, FallbackReason::NoModel));
        };

        let request = GenerateRequest {
            model: model.clone(),
            prompt: prompt.to_string(),
            max_tokens,
            temperature: self.settings.temperature,
        };

        match self
            .backend
            .generate(&request, self.settings.generate_timeout)
            .await
        {
            Ok(text) => {
                debug!(model = %model, chars = text.len(), "generation succeeded");
                Ok(InferenceReply {
                    text,
                    source: ReplySource::Model { model },
                })
            }
            Err(e) if e.is_timeout() && self.settings.propagate_timeouts => {
                warn!(model = %model, error = %e, "generation timed out");
                Err(e)
            }
            Err(e) if e.is_environmental() => {
                debug!(model = %model, error = %e, "generation failed");
                Ok(self.fallback(prompt, FallbackReason::from_error(&e)))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let mut config = LumenConfig::default();
        config.gateway.timeout_secs = 42;
        config.gateway.propagate_timeouts = true;
        config.probe.reuse_window_ms = 250;

        let settings = GatewaySettings::from_config(&config);
        assert_eq!(settings.generate_timeout, Duration::from_secs(42));
        assert_eq!(settings.probe_reuse_window, Duration::from_millis(250));
        assert_eq!(settings.init_grace, Duration::from_secs(2));
        assert!(settings.propagate_timeouts);
    }

    #[test]
    fn default_settings_match_default_config() {
        let settings = GatewaySettings::default();
        assert_eq!(settings.generate_timeout, Duration::from_secs(300));
        assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
        assert!(!settings.propagate_timeouts);
    }
}
