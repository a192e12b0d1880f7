// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process resource sampling for status display.
//!
//! Process CPU usage and disk rates are measured between two refreshes, so
//! the first sample of a new sampler reports zero for both.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::{Pid, ProcessesToUpdate, System};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const BYTES_PER_GB: f64 = BYTES_PER_MB * 1024.0;

/// One snapshot of this process and the host.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSample {
    /// Process CPU usage; may exceed 100 on multi-core hosts.
    pub cpu_percent: f32,
    /// Process resident memory in MB.
    pub memory_mb: f64,
    /// Process resident memory as a share of total host memory.
    pub memory_percent: f64,
    pub available_memory_gb: f64,
    /// Bytes per second read from disk since the previous sample.
    pub disk_read_bytes_per_sec: f64,
    /// Bytes per second written to disk since the previous sample.
    pub disk_write_bytes_per_sec: f64,
    /// Thread count, where the platform reports it.
    pub threads: Option<usize>,
    pub pid: u32,
    pub sampled_at: DateTime<Utc>,
}

/// Samples resource usage of the current process.
pub struct ResourceSampler {
    system: System,
    pid: Pid,
    last_refresh: Option<Instant>,
}

impl ResourceSampler {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            pid: Pid::from_u32(std::process::id()),
            last_refresh: None,
        }
    }

    /// Refreshes and returns the current sample.
    pub fn sample_once(&mut self) -> ResourceSample {
        self.system.refresh_memory();
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
        let now = Instant::now();
        let elapsed_secs = self
            .last_refresh
            .replace(now)
            .map(|previous| now.duration_since(previous).as_secs_f64());

        let mut sample = ResourceSample {
            cpu_percent: 0.0,
            memory_mb: 0.0,
            memory_percent: 0.0,
            available_memory_gb: self.system.available_memory() as f64 / BYTES_PER_GB,
            disk_read_bytes_per_sec: 0.0,
            disk_write_bytes_per_sec: 0.0,
            threads: None,
            pid: self.pid.as_u32(),
            sampled_at: Utc::now(),
        };
        if let Some(process) = self.system.process(self.pid) {
            let rss_bytes = process.memory();
            let disk = process.disk_usage();
            sample.cpu_percent = process.cpu_usage();
            sample.memory_mb = rss_bytes as f64 / BYTES_PER_MB;
            sample.memory_percent = percent_of(rss_bytes, self.system.total_memory());
            sample.threads = process.tasks().map(|tasks| tasks.len());
            if let Some(secs) = elapsed_secs {
                sample.disk_read_bytes_per_sec = rate(disk.read_bytes, secs);
                sample.disk_write_bytes_per_sec = rate(disk.written_bytes, secs);
            }
        }
        sample
    }
}

impl Default for ResourceSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn rate(bytes: u64, secs: f64) -> f64 {
    if secs <= 0.0 {
        return 0.0;
    }
    bytes as f64 / secs
}

fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}
