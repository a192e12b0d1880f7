// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted catalog, probe and generation backend.
//!
//! Each fake counts its calls so tests can assert which steps of the
//! gateway ran.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use lumen_core::traits::{AvailabilityProbe, GenerationBackend, ModelCatalog, PluginAdapter};
use lumen_core::types::{GenerateRequest, ProbeFailure, ProbeReport, Reachability};
use lumen_core::LumenError;

/// Endpoint reported by [`FixedProbe`] when reachable.
pub const FIXED_ENDPOINT: &str = "http://fixed.test";

/// Catalog that answers with a fixed listing.
pub struct StaticCatalog {
    models: RwLock<Vec<String>>,
    last: RwLock<Vec<String>>,
    calls: AtomicUsize,
}

impl StaticCatalog {
    pub fn new(models: Vec<String>) -> Self {
        Self {
            models: RwLock::new(models),
            last: RwLock::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A catalog that always lists nothing, like an absent server.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn set_models(&self, models: Vec<String>) {
        *self.models.write().unwrap_or_else(|p| p.into_inner()) = models;
    }

    /// Number of `list_models` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PluginAdapter for StaticCatalog {
    fn name(&self) -> &str {
        "static-catalog"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl ModelCatalog for StaticCatalog {
    async fn list_models(&self) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let models = self.models.read().unwrap_or_else(|p| p.into_inner()).clone();
        if !models.is_empty() {
            *self.last.write().unwrap_or_else(|p| p.into_inner()) = models.clone();
        }
        models
    }

    fn last_listing(&self) -> Vec<String> {
        self.last.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

/// Probe that reports whatever reachability it was told to.
pub struct FixedProbe {
    reachability: RwLock<Reachability>,
    last: RwLock<Option<ProbeReport>>,
    calls: AtomicUsize,
}

impl FixedProbe {
    pub fn new(reachability: Reachability) -> Self {
        Self {
            reachability: RwLock::new(reachability),
            last: RwLock::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn reachable() -> Self {
        Self::new(Reachability::Reachable)
    }

    /// Unreachable with a refused connection.
    pub fn unreachable() -> Self {
        Self::new(Reachability::Unreachable(ProbeFailure::ConnectionRefused))
    }

    /// Changes the reachability reported by later probes.
    pub fn set_reachability(&self, reachability: Reachability) {
        *self.reachability.write().unwrap_or_else(|p| p.into_inner()) = reachability;
    }

    /// Number of `probe_once` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PluginAdapter for FixedProbe {
    fn name(&self) -> &str {
        "fixed-probe"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl AvailabilityProbe for FixedProbe {
    async fn probe_once(&self) -> ProbeReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reachability = self
            .reachability
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        let report = match reachability {
            Reachability::Reachable => ProbeReport::reachable(FIXED_ENDPOINT, Duration::ZERO),
            Reachability::Unreachable(failure) => ProbeReport::unreachable(failure, Duration::ZERO),
            Reachability::Unknown => ProbeReport {
                reachability: Reachability::Unknown,
                ..ProbeReport::unreachable(ProbeFailure::Other("unknown".into()), Duration::ZERO)
            },
        };
        *self.last.write().unwrap_or_else(|p| p.into_inner()) = Some(report.clone());
        report
    }

    fn last_report(&self) -> Option<ProbeReport> {
        self.last.read().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

/// Generation backend that replays queued outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty,
/// `"scripted reply"` is returned.
pub struct ScriptedBackend {
    outcomes: Mutex<VecDeque<Result<String, LumenError>>>,
    requests: Mutex<Vec<GenerateRequest>>,
    delay: Option<Duration>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// A backend pre-loaded with successful replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            outcomes: Mutex::new(replies.into_iter().map(Ok).collect()),
            ..Self::new()
        }
    }

    /// Every call takes `delay`. A delay past the caller's timeout yields `Timeout`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_reply(&self, text: impl Into<String>) {
        self.outcomes.lock().await.push_back(Ok(text.into()));
    }

    pub async fn push_error(&self, error: LumenError) {
        self.outcomes.lock().await.push_back(Err(error));
    }

    /// Requests received so far, in order.
    pub async fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginAdapter for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<String, LumenError> {
        self.requests.lock().await.push(request.clone());

        if let Some(delay) = self.delay {
            if delay > timeout {
                tokio::time::sleep(timeout).await;
                return Err(LumenError::Timeout {
                    duration: timeout,
                    source: None,
                });
            }
            tokio::time::sleep(delay).await;
        }

        self.outcomes
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("scripted reply".to_string()))
    }
}
