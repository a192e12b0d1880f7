// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Lumen configuration system.

use std::io::Write;

use lumen_config::diagnostic::ConfigError;
use lumen_config::model::LumenConfig;
use lumen_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_lumen_config() {
    let toml = r#"
[agent]
log_level = "debug"
max_tokens = 256

[server]
hosts = ["127.0.0.1"]
port = 8080
scheme = "https"

[catalog]
timeout_ms = 1500

[probe]
timeout_ms = 500
interval_ms = 250
reuse_window_ms = 0

[gateway]
timeout_secs = 60
temperature = 0.2
init_grace_ms = 100
propagate_timeouts = true

[selection]
default_model = "phi3"
override_model = "mistral:7b"

[mock]
seed = 42

[monitor]
sample_interval_ms = 1000
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.agent.max_tokens, 256);
    assert_eq!(config.server.base_urls(), vec!["https://127.0.0.1:8080"]);
    assert_eq!(config.catalog.timeout_ms, 1500);
    assert_eq!(config.probe.reuse_window_ms, 0);
    assert_eq!(config.gateway.timeout_secs, 60);
    assert!(config.gateway.propagate_timeouts);
    assert_eq!(config.selection.override_model.as_deref(), Some("mistral:7b"));
    assert_eq!(config.mock.seed, Some(42));
    assert_eq!(config.monitor.sample_interval_ms, 1000);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.log_level, "info");
    assert_eq!(config.agent.max_tokens, 100);
    assert_eq!(config.server.hosts, vec!["localhost", "127.0.0.1"]);
    assert_eq!(config.server.port, 11434);
    assert_eq!(config.catalog.timeout_ms, 3000);
    assert_eq!(config.probe.timeout_ms, 2000);
    assert_eq!(config.gateway.timeout_secs, 300);
    assert!(!config.gateway.propagate_timeouts);
    assert_eq!(config.selection.default_model, "llama3.2");
    assert!(config.selection.override_model.is_none());
    assert!(config.selection.policies.is_empty());
    assert!(config.mock.seed.is_none());
}

/// A misspelled key is reported with a suggestion and a source span.
#[test]
fn unknown_key_reports_suggestion_and_span() {
    let toml = r#"
[probe]
timout_ms = 500
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown key");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "timout_ms");
            assert_eq!(suggestion.as_deref(), Some("timeout_ms"));
            assert!(span.is_some(), "inline source should yield a span");
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telemetry]
enabled = true
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown section");
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "telemetry"));
}

/// Wrong value type is surfaced as InvalidType.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[server]
hosts = "localhost"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject a bare string");
    assert!(matches!(&errors[0], ConfigError::InvalidType { .. }));
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_are_collected() {
    let toml = r#"
[server]
hosts = []
port = 0

[gateway]
temperature = 9.0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors.len() >= 3, "expected every violation, got {errors:?}");
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// Dot-notation overrides land on underscored keys without splitting them.
#[test]
fn dotted_override_sets_underscored_key() {
    use figment::{providers::Serialized, Figment};

    let config: LumenConfig = Figment::new()
        .merge(Serialized::defaults(LumenConfig::default()))
        .merge(("gateway.timeout_secs", 12))
        .merge(("selection.default_model", "tinyllama"))
        .extract()
        .expect("should merge overrides");

    assert_eq!(config.gateway.timeout_secs, 12);
    assert_eq!(config.selection.default_model, "tinyllama");
}

/// An explicit config file is loaded and validated.
#[test]
fn explicit_path_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[server]\nport = 9999").expect("write config");

    let config = load_and_validate_path(file.path()).expect("file should load");
    assert_eq!(config.server.port, 9999);
}

/// A nonexistent explicit path is an error rather than silently defaulting.
#[test]
fn explicit_missing_path_is_an_error() {
    let errors = load_and_validate_path(std::path::Path::new("/nonexistent/lumen.toml"))
        .expect_err("missing file should be reported");
    assert!(matches!(&errors[0], ConfigError::Other(msg) if msg.contains("does not exist")));
}

/// Unknown key inside an explicit file carries the file as its source.
#[test]
fn explicit_path_unknown_key_has_span() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[agent]\nmax_tokns = 5").expect("write config");

    let errors = load_and_validate_path(file.path()).expect_err("should reject unknown key");
    match &errors[0] {
        ConfigError::UnknownKey {
            suggestion, span, ..
        } => {
            assert_eq!(suggestion.as_deref(), Some("max_tokens"));
            assert!(span.is_some());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}
