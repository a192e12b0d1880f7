// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that serde attributes cannot express, such
//! as non-empty host lists, non-zero timeouts, and a bounded temperature.

use crate::diagnostic::ConfigError;
use crate::model::LumenConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns all collected errors; does not stop at the first one.
pub fn validate_config(config: &LumenConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.agent.max_tokens == 0 {
        errors.push(ConfigError::validation("agent.max_tokens must be greater than 0"));
    }

    if config.server.hosts.is_empty() {
        errors.push(ConfigError::validation("server.hosts must list at least one host"));
    }

    for (i, host) in config.server.hosts.iter().enumerate() {
        let host = host.trim();
        if host.is_empty() {
            errors.push(ConfigError::validation(format!(
                "server.hosts[{i}] must not be empty"
            )));
            continue;
        }
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            errors.push(ConfigError::validation(format!(
                "server.hosts[{i}] `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must not be 0"));
    }

    if !matches!(config.server.scheme.as_str(), "http" | "https") {
        errors.push(ConfigError::validation(format!(
            "server.scheme must be `http` or `https`, got `{}`",
            config.server.scheme
        )));
    }

    let timeouts = [
        ("catalog.timeout_ms", config.catalog.timeout_ms),
        ("probe.timeout_ms", config.probe.timeout_ms),
        ("probe.interval_ms", config.probe.interval_ms),
        ("gateway.timeout_secs", config.gateway.timeout_secs),
        ("monitor.sample_interval_ms", config.monitor.sample_interval_ms),
    ];
    for (key, value) in timeouts {
        if value == 0 {
            errors.push(ConfigError::validation(format!("{key} must be greater than 0")));
        }
    }

    let temperature = config.gateway.temperature;
    if !(0.0..=2.0).contains(&temperature) {
        errors.push(ConfigError::validation(format!(
            "gateway.temperature must be within 0.0..=2.0, got {temperature}"
        )));
    }

    if config.selection.default_model.trim().is_empty() {
        errors.push(ConfigError::validation("selection.default_model must not be empty"));
    }

    if let Some(model) = &config.selection.override_model {
        if model.trim().is_empty() {
            errors.push(ConfigError::validation(
                "selection.override_model must not be empty when set",
            ));
        }
    }

    for (i, policy) in config.selection.policies.iter().enumerate() {
        if policy.pattern.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "selection.policies[{i}].pattern must not be empty"
            )));
        }
        if policy.min_memory_gb < 0.0 || !policy.min_memory_gb.is_finite() {
            errors.push(ConfigError::validation(format!(
                "selection.policies[{i}].min_memory_gb must be a non-negative number, got {}",
                policy.min_memory_gb
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SelectionPolicyConfig;

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&LumenConfig::default()).is_ok());
    }

    #[test]
    fn empty_hosts_fail_validation() {
        let mut config = LumenConfig::default();
        config.server.hosts.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "server.hosts"));
    }

    #[test]
    fn blank_host_entry_fails_validation() {
        let mut config = LumenConfig::default();
        config.server.hosts = vec!["localhost".into(), "  ".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "server.hosts[1]"));
    }

    #[test]
    fn host_with_path_fails_validation() {
        let mut config = LumenConfig::default();
        config.server.hosts = vec!["localhost/api".into()];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "not a valid IP address or hostname"));
    }

    #[test]
    fn zero_timeouts_are_all_reported() {
        let mut config = LumenConfig::default();
        config.catalog.timeout_ms = 0;
        config.gateway.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "catalog.timeout_ms"));
        assert!(has_message(&errors, "gateway.timeout_secs"));
    }

    #[test]
    fn temperature_out_of_range_fails() {
        let mut config = LumenConfig::default();
        config.gateway.temperature = 3.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "gateway.temperature"));
    }

    #[test]
    fn unknown_scheme_and_log_level_fail() {
        let mut config = LumenConfig::default();
        config.server.scheme = "ftp".into();
        config.agent.log_level = "verbose".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "server.scheme"));
        assert!(has_message(&errors, "agent.log_level"));
    }

    #[test]
    fn bad_policy_rows_fail() {
        let mut config = LumenConfig::default();
        config.selection.policies = vec![
            SelectionPolicyConfig {
                pattern: "".into(),
                min_memory_gb: 4.0,
                priority: 1,
            },
            SelectionPolicyConfig {
                pattern: "phi3".into(),
                min_memory_gb: -1.0,
                priority: 1,
            },
        ];
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "policies[0].pattern"));
        assert!(has_message(&errors, "policies[1].min_memory_gb"));
    }

    #[test]
    fn blank_override_fails() {
        let mut config = LumenConfig::default();
        config.selection.override_model = Some(" ".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "override_model"));
    }
}
