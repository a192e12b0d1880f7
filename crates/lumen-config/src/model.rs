// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Lumen chat client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Lumen configuration.
///
/// Every section is optional and defaults to values that target a local
/// Ollama-compatible server on its standard port.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LumenConfig {
    /// Client behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Where the inference server lives.
    #[serde(default)]
    pub server: ServerConfig,

    /// Model listing settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Health probe settings.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Generation call settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Model selection settings.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Offline responder settings.
    #[serde(default)]
    pub mock: MockConfig,

    /// Resource sampling settings.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Client behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum tokens requested per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_tokens() -> u32 {
    100
}

/// Inference server location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Equivalent host names, tried in order.
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,

    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// URL scheme (`http` or `https`).
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            port: default_port(),
            scheme: default_scheme(),
        }
    }
}

impl ServerConfig {
    /// Base addresses in probing order, e.g. `http://localhost:11434`.
    pub fn base_urls(&self) -> Vec<String> {
        self.hosts
            .iter()
            .map(|host| format!("{}://{}:{}", self.scheme, host.trim(), self.port))
            .collect()
    }
}

fn default_hosts() -> Vec<String> {
    vec!["localhost".to_string(), "127.0.0.1".to_string()]
}

fn default_port() -> u16 {
    11434
}

fn default_scheme() -> String {
    "http".to_string()
}

/// Model listing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Deadline for the listing request, in milliseconds.
    #[serde(default = "default_catalog_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_catalog_timeout_ms(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_catalog_timeout_ms() -> u64 {
    3000
}

/// Health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// Deadline for each health request, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,

    /// Interval between scheduled probes, in milliseconds.
    #[serde(default = "default_probe_interval_ms")]
    pub interval_ms: u64,

    /// A report younger than this is reused instead of probing again.
    #[serde(default = "default_reuse_window_ms")]
    pub reuse_window_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_probe_timeout_ms(),
            interval_ms: default_probe_interval_ms(),
            reuse_window_ms: default_reuse_window_ms(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn reuse_window(&self) -> Duration {
        Duration::from_millis(self.reuse_window_ms)
    }
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_probe_interval_ms() -> u64 {
    1000
}

fn default_reuse_window_ms() -> u64 {
    1000
}

/// Generation call configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Deadline for a generation call, in seconds. First-time model loads are slow.
    #[serde(default = "default_generate_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature sent with every request.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// How long `infer` waits for a pending catalog refresh, in milliseconds.
    #[serde(default = "default_init_grace_ms")]
    pub init_grace_ms: u64,

    /// Surface generation timeouts to the caller instead of answering offline.
    #[serde(default)]
    pub propagate_timeouts: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_generate_timeout_secs(),
            temperature: default_temperature(),
            init_grace_ms: default_init_grace_ms(),
            propagate_timeouts: false,
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn init_grace(&self) -> Duration {
        Duration::from_millis(self.init_grace_ms)
    }
}

fn default_generate_timeout_secs() -> u64 {
    300
}

fn default_temperature() -> f32 {
    0.7
}

fn default_init_grace_ms() -> u64 {
    2000
}

/// Model selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// Identifier used when the catalog is empty.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Model to use regardless of ranking.
    #[serde(default)]
    pub override_model: Option<String>,

    /// Ranked preference table. Empty uses the built-in table.
    #[serde(default)]
    pub policies: Vec<SelectionPolicyConfig>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            override_model: None,
            policies: Vec::new(),
        }
    }
}

fn default_model() -> String {
    "llama3.2".to_string()
}

/// One row of the preference table.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SelectionPolicyConfig {
    /// Model-name prefix or exact name.
    pub pattern: String,

    /// Minimum available memory in GB.
    #[serde(default)]
    pub min_memory_gb: f64,

    /// Higher wins.
    #[serde(default)]
    pub priority: i32,
}

/// Offline responder configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MockConfig {
    /// Seed for reproducible offline replies. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Resource sampling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Interval between resource samples, in milliseconds.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl MonitorConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

fn default_sample_interval_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_follow_host_order() {
        let server = ServerConfig::default();
        assert_eq!(
            server.base_urls(),
            vec!["http://localhost:11434", "http://127.0.0.1:11434"]
        );
    }

    #[test]
    fn durations_convert_units() {
        let config = LumenConfig::default();
        assert_eq!(config.catalog.timeout(), Duration::from_secs(3));
        assert_eq!(config.probe.timeout(), Duration::from_secs(2));
        assert_eq!(config.probe.interval(), Duration::from_secs(1));
        assert_eq!(config.gateway.timeout(), Duration::from_secs(300));
        assert_eq!(config.gateway.init_grace(), Duration::from_secs(2));
    }

    #[test]
    fn policies_deserialize_from_array_of_tables() {
        let toml_str = r#"
[selection]
default_model = "phi3"

[[selection.policies]]
pattern = "mistral"
min_memory_gb = 16.0
priority = 70

[[selection.policies]]
pattern = "phi3"
"#;
        let config: LumenConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.selection.default_model, "phi3");
        assert_eq!(config.selection.policies.len(), 2);
        assert_eq!(config.selection.policies[0].priority, 70);
        assert_eq!(config.selection.policies[1].min_memory_gb, 0.0);
    }

    #[test]
    fn policies_deny_unknown_fields() {
        let toml_str = r#"
[[selection.policies]]
pattern = "mistral"
min_ram = 16
"#;
        assert!(toml::from_str::<LumenConfig>(toml_str).is_err());
    }
}
