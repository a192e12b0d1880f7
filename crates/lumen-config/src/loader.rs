// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lumen.toml` > `~/.config/lumen/lumen.toml` > `/etc/lumen/lumen.toml`
//! with environment variable overrides via `LUMEN_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LumenConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/lumen/lumen.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "lumen.toml";

/// Config sections, used to map `LUMEN_<SECTION>_<KEY>` onto `section.key`.
const SECTIONS: &[&str] = &[
    "agent", "server", "catalog", "probe", "gateway", "selection", "mock", "monitor",
];

/// The per-user config file, if a config directory exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lumen/lumen.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lumen/lumen.toml` (system-wide)
/// 3. `~/.config/lumen/lumen.toml` (user XDG config)
/// 4. `./lumen.toml` (local directory)
/// 5. `LUMEN_*` environment variables
pub fn load_config() -> Result<LumenConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LumenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LumenConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LumenConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LumenConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LumenConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `LUMEN_GATEWAY_TIMEOUT_SECS` to `gateway.timeout_secs`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that themselves contain underscores stay intact.
fn env_provider() -> Env {
    // Keys reach `map` with their original case.
    Env::prefixed("LUMEN_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("server_port"), "server.port");
        assert_eq!(map_env_key("gateway_timeout_secs"), "gateway.timeout_secs");
        assert_eq!(map_env_key("probe_reuse_window_ms"), "probe.reuse_window_ms");
        assert_eq!(map_env_key("selection_default_model"), "selection.default_model");
        assert_eq!(map_env_key("mock_seed"), "mock.seed");
    }

    #[test]
    fn unknown_section_is_left_alone() {
        assert_eq!(map_env_key("telemetry_level"), "telemetry_level");
    }
}
