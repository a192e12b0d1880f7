// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability prober.
//!
//! A probe is one `GET /api/version` per configured address, in order,
//! stopping at the first 2xx. The address that answered becomes the active
//! one for catalog and generation calls. Failures are recorded as status and
//! never returned as errors.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lumen_core::error::LumenError;
use lumen_core::traits::{AvailabilityProbe, PluginAdapter};
use lumen_core::types::{ProbeFailure, ProbeReport};
use tracing::{debug, info};

use crate::client::OllamaClient;

/// Health checker over every configured server address.
pub struct AvailabilityProber {
    client: OllamaClient,
    timeout: Duration,
    last: RwLock<Option<ProbeReport>>,
}

impl AvailabilityProber {
    pub fn new(client: OllamaClient, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            last: RwLock::new(None),
        }
    }

    fn record(&self, report: ProbeReport) {
        let mut last = self
            .last
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let changed = last
            .as_ref()
            .is_none_or(|prev| prev.reachability != report.reachability);
        if changed {
            info!(state = %report.reachability, "server availability changed");
        }
        *last = Some(report);
    }
}

impl PluginAdapter for AvailabilityProber {
    fn name(&self) -> &str {
        "ollama-probe"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }
}

#[async_trait]
impl AvailabilityProbe for AvailabilityProber {
    async fn probe_once(&self) -> ProbeReport {
        let started = Instant::now();
        let mut last_error: Option<LumenError> = None;

        for base in self.client.base_urls() {
            match self.client.server_version(base, self.timeout).await {
                Ok(version) => {
                    debug!(endpoint = %base, version = ?version, "health check passed");
                    self.client.set_active_base_url(base);
                    let report = ProbeReport::reachable(base.clone(), started.elapsed());
                    self.record(report.clone());
                    return report;
                }
                Err(e) => {
                    debug!(endpoint = %base, error = %e, "health check failed");
                    last_error = Some(e);
                }
            }
        }

        let failure = last_error
            .as_ref()
            .map(ProbeFailure::from)
            .unwrap_or_else(|| ProbeFailure::Other("no server address configured".into()));
        let report = ProbeReport::unreachable(failure, started.elapsed());
        self.record(report.clone());
        report
    }

    fn last_report(&self) -> Option<ProbeReport> {
        self.last
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
