// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability probe trait.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::{ProbeReport, Reachability};

/// Cheap health checks against the inference server.
///
/// Failures are reported as status inside the [`ProbeReport`], never as errors.
/// The probe owns no timer; an external scheduler calls [`probe_once`](Self::probe_once).
#[async_trait]
pub trait AvailabilityProbe: PluginAdapter {
    /// Performs one health check and records the result.
    async fn probe_once(&self) -> ProbeReport;

    /// The most recent report, if any probe has completed.
    fn last_report(&self) -> Option<ProbeReport>;

    /// Current state: `Unknown` until the first probe completes.
    fn state(&self) -> Reachability {
        self.last_report()
            .map(|report| report.reachability)
            .unwrap_or_default()
    }
}
