// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lumen status` command implementation.
//!
//! Runs one availability probe against the configured server addresses and
//! takes a resource sample of this process. A down server is reported, never
//! treated as an error.

use std::io::IsTerminal;

use lumen_config::LumenConfig;
use lumen_core::traits::AvailabilityProbe;
use lumen_core::types::{ProbeReport, Reachability};
use lumen_core::LumenError;
use lumen_ollama::OllamaAdapters;
use serde::Serialize;

use crate::monitor::{ResourceSample, ResourceSampler};

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub reachable: bool,
    pub state: String,
    /// Address that answered the probe.
    pub endpoint: Option<String>,
    pub latency_ms: u64,
    /// Every configured address, in probe order.
    pub endpoints: Vec<String>,
    pub resources: ResourceSample,
}

impl StatusResponse {
    pub fn new(report: &ProbeReport, endpoints: Vec<String>, resources: ResourceSample) -> Self {
        Self {
            reachable: report.is_reachable(),
            state: report.reachability.to_string(),
            endpoint: report.endpoint.clone(),
            latency_ms: report.latency.as_millis() as u64,
            endpoints,
            resources,
        }
    }
}

/// Run the `lumen status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(config: &LumenConfig, json: bool, plain: bool) -> Result<(), LumenError> {
    let adapters = OllamaAdapters::from_config(config)?;

    let mut sampler = ResourceSampler::new();
    sampler.sample_once();
    let report = adapters.prober.probe_once().await;
    tokio::time::sleep(config.monitor.sample_interval()).await;
    let resources = sampler.sample_once();

    let status = StatusResponse::new(&report, adapters.client.base_urls().to_vec(), resources);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, &report.reachability, use_color);
    }
    Ok(())
}

fn print_status(status: &StatusResponse, reachability: &Reachability, use_color: bool) {
    println!();
    println!("  lumen status");
    println!("  {}", "-".repeat(35));

    let state = match reachability {
        Reachability::Reachable => format!(
            "reachable at {} ({} ms)",
            status.endpoint.as_deref().unwrap_or("?"),
            status.latency_ms
        ),
        other => other.to_string(),
    };
    if use_color {
        use colored::Colorize;
        if status.reachable {
            println!("    Server:   {} {}", "✓".green(), state.green());
        } else {
            println!("    Server:   {} {}", "✗".red(), state.red());
        }
    } else if status.reachable {
        println!("    Server:   [OK] {state}");
    } else {
        println!("    Server:   [FAIL] {state}");
    }

    println!("    Tried:    {}", status.endpoints.join(", "));
    println!("    CPU:      {:.1}%", status.resources.cpu_percent);
    println!(
        "    Memory:   {:.1} MB ({:.2}% of host)",
        status.resources.memory_mb, status.resources.memory_percent
    );
    println!(
        "    Disk:     {:.1} KB/s read, {:.1} KB/s written",
        status.resources.disk_read_bytes_per_sec / 1024.0,
        status.resources.disk_write_bytes_per_sec / 1024.0
    );
    if let Some(threads) = status.resources.threads {
        println!("    Threads:  {threads} (pid {})", status.resources.pid);
    } else {
        println!("    PID:      {}", status.resources.pid);
    }
    println!(
        "    Host:     {:.1} GB available",
        status.resources.available_memory_gb
    );
    println!();

    if !status.reachable {
        println!("  Replies will come from the offline responder until the server is up.");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use lumen_core::types::ProbeFailure;

    #[test]
    fn reachable_status_serializes() {
        let report = ProbeReport::reachable("http://localhost:11434", Duration::from_millis(12));
        let status = StatusResponse::new(
            &report,
            vec!["http://localhost:11434".into()],
            ResourceSampler::new().sample_once(),
        );
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"reachable\":true"));
        assert!(json.contains("\"endpoint\":\"http://localhost:11434\""));
        assert!(json.contains("\"latency_ms\":12"));
    }

    #[test]
    fn unreachable_status_carries_failure() {
        let report = ProbeReport::unreachable(ProbeFailure::ConnectionRefused, Duration::ZERO);
        let status = StatusResponse::new(&report, Vec::new(), ResourceSampler::new().sample_once());
        assert!(!status.reachable);
        assert!(status.endpoint.is_none());
        assert_eq!(status.state, report.reachability.to_string());
    }
}
