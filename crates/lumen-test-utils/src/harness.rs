// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete gateway and orchestrator over scripted
//! adapters. Probes are never reused and the initialization grace is short,
//! so switching reachability between calls takes effect immediately.

use std::sync::Arc;
use std::time::Duration;

use lumen_agent::{ChatOrchestrator, GatewaySettings, InferenceGateway, MockResponder};
use lumen_core::types::{ChatSession, InferenceReply};
use lumen_core::LumenError;
use lumen_router::{builtin_policies, ModelSelector};

use crate::mock_adapters::{FixedProbe, ScriptedBackend, StaticCatalog};

/// Default model used by the selector when the catalog is empty.
pub const HARNESS_DEFAULT_MODEL: &str = "llama3.2";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    models: Vec<String>,
    reachable: bool,
    replies: Vec<String>,
    backend_delay: Option<Duration>,
    generate_timeout: Duration,
    propagate_timeouts: bool,
    mock_seed: u64,
    memory_gb: f64,
    max_tokens: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            models: Vec::new(),
            reachable: true,
            replies: Vec::new(),
            backend_delay: None,
            generate_timeout: Duration::from_secs(5),
            propagate_timeouts: false,
            mock_seed: 7,
            memory_gb: 16.0,
            max_tokens: 100,
        }
    }

    /// Models listed by the catalog.
    pub fn with_models(mut self, models: &[&str]) -> Self {
        self.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Every probe reports a refused connection.
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Replies returned by the generation backend, in order.
    pub fn with_backend_replies(mut self, replies: Vec<String>) -> Self {
        self.replies = replies;
        self
    }

    /// Backend latency and the gateway's generation timeout.
    pub fn with_backend_delay(mut self, delay: Duration, timeout: Duration) -> Self {
        self.backend_delay = Some(delay);
        self.generate_timeout = timeout;
        self
    }

    pub fn propagate_timeouts(mut self) -> Self {
        self.propagate_timeouts = true;
        self
    }

    pub fn with_memory_gb(mut self, memory_gb: f64) -> Self {
        self.memory_gb = memory_gb;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> TestHarness {
        let catalog = Arc::new(StaticCatalog::new(self.models));
        let probe = Arc::new(if self.reachable {
            FixedProbe::reachable()
        } else {
            FixedProbe::unreachable()
        });
        let mut backend = ScriptedBackend::with_replies(self.replies);
        if let Some(delay) = self.backend_delay {
            backend = backend.with_delay(delay);
        }
        let backend = Arc::new(backend);

        let settings = GatewaySettings {
            generate_timeout: self.generate_timeout,
            temperature: 0.7,
            init_grace: Duration::from_millis(50),
            probe_reuse_window: Duration::ZERO,
            propagate_timeouts: self.propagate_timeouts,
        };
        let memory_gb = self.memory_gb;
        let gateway = Arc::new(
            InferenceGateway::new(catalog.clone(), probe.clone(), backend.clone(), settings)
                .with_selector(ModelSelector::new(builtin_policies(), HARNESS_DEFAULT_MODEL))
                .with_mock(MockResponder::with_seed(self.mock_seed))
                .with_memory_source(Arc::new(move || memory_gb)),
        );
        let orchestrator = Arc::new(ChatOrchestrator::new(gateway.clone(), self.max_tokens));

        TestHarness {
            catalog,
            probe,
            backend,
            gateway,
            orchestrator,
        }
    }
}

/// A gateway and orchestrator wired to scripted adapters.
pub struct TestHarness {
    pub catalog: Arc<StaticCatalog>,
    pub probe: Arc<FixedProbe>,
    pub backend: Arc<ScriptedBackend>,
    pub gateway: Arc<InferenceGateway>,
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Starts a session on `model`.
    pub async fn start_session(&self, model: &str) -> Result<ChatSession, LumenError> {
        self.orchestrator.start_session(model).await
    }

    /// Drives one turn through the full pipeline.
    pub async fn send_message(
        &self,
        session: &ChatSession,
        text: &str,
    ) -> Result<InferenceReply, LumenError> {
        self.orchestrator
            .send_message_detailed(&session.id().0, text)
            .await
    }
}
