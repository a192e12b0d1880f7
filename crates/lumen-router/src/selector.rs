// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog ranking and model selection.
//!
//! Selection order: explicit override > ranked preference table > first
//! catalog entry > configured default.

use lumen_config::model::SelectionConfig;
use lumen_core::error::{require_non_blank, LumenError};
use tracing::{debug, info};

/// One row of the preference table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPolicy {
    /// Exact model name or name prefix.
    pub pattern: String,
    /// Minimum available host memory in GB.
    pub min_memory_gb: f64,
    /// Higher wins.
    pub priority: i32,
}

impl SelectionPolicy {
    pub fn new(pattern: impl Into<String>, min_memory_gb: f64, priority: i32) -> Self {
        Self {
            pattern: pattern.into(),
            min_memory_gb,
            priority,
        }
    }

    /// First catalog entry this row matches: exact name first, then any entry containing the pattern.
    fn find_match<'a>(&self, catalog: &'a [String]) -> Option<&'a String> {
        let pattern = self.pattern.to_lowercase();
        catalog
            .iter()
            .find(|entry| entry.to_lowercase() == pattern)
            .or_else(|| {
                catalog
                    .iter()
                    .find(|entry| entry.to_lowercase().contains(&pattern))
            })
    }
}

/// The table used when configuration supplies none, highest priority first.
pub fn builtin_policies() -> Vec<SelectionPolicy> {
    vec![
        SelectionPolicy::new("llama3.1:70b", 48.0, 100),
        SelectionPolicy::new("mixtral", 32.0, 90),
        SelectionPolicy::new("llama3", 8.0, 80),
        SelectionPolicy::new("mistral", 16.0, 70),
        SelectionPolicy::new("llama2", 8.0, 60),
        SelectionPolicy::new("phi3", 4.0, 50),
        SelectionPolicy::new("gemma", 4.0, 40),
        SelectionPolicy::new("tinyllama", 2.0, 10),
    ]
}

/// Picks one model identifier from a catalog.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    policies: Vec<SelectionPolicy>,
    default_model: String,
    selected: Option<String>,
    pinned: bool,
}

impl ModelSelector {
    /// Create a selector with the given table and empty-catalog default.
    pub fn new(policies: Vec<SelectionPolicy>, default_model: impl Into<String>) -> Self {
        Self {
            policies,
            default_model: default_model.into(),
            selected: None,
            pinned: false,
        }
    }

    /// Build from the `[selection]` section. An `override_model` is pinned.
    pub fn from_config(config: &SelectionConfig) -> Self {
        let policies = if config.policies.is_empty() {
            builtin_policies()
        } else {
            config
                .policies
                .iter()
                .map(|p| SelectionPolicy::new(p.pattern.trim(), p.min_memory_gb, p.priority))
                .collect()
        };
        let mut selector = Self::new(policies, config.default_model.trim());
        if let Some(model) = config.override_model.as_deref() {
            if !model.trim().is_empty() {
                selector.selected = Some(model.trim().to_string());
                selector.pinned = true;
            }
        }
        selector
    }

    pub fn policies(&self) -> &[SelectionPolicy] {
        &self.policies
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Ranks `catalog` against the table. Pure: same inputs, same answer.
    ///
    /// Among rows that match some entry and whose memory requirement is met,
    /// the strictly highest priority wins; ties keep the earlier row. With no
    /// eligible row the first catalog entry is returned, and with an empty
    /// catalog the default identifier.
    pub fn select_optimal(&self, catalog: &[String], available_memory_gb: f64) -> String {
        let Some(first) = catalog.first() else {
            return self.default_model.clone();
        };

        let mut best: Option<(&SelectionPolicy, &String)> = None;
        for policy in &self.policies {
            let Some(entry) = policy.find_match(catalog) else {
                continue;
            };
            if available_memory_gb < policy.min_memory_gb {
                debug!(
                    pattern = %policy.pattern,
                    required_gb = policy.min_memory_gb,
                    available_gb = available_memory_gb,
                    "policy skipped, not enough memory"
                );
                continue;
            }
            if best.is_none_or(|(current, _)| policy.priority > current.priority) {
                best = Some((policy, entry));
            }
        }

        best.map(|(_, entry)| entry.clone())
            .unwrap_or_else(|| first.clone())
    }

    /// Pins `name` as the selection until changed or cleared.
    pub fn set_selected(&mut self, name: &str) -> Result<(), LumenError> {
        require_non_blank(name, "model name")?;
        let name = name.trim().to_string();
        info!(model = %name, "model selected by override");
        self.selected = Some(name);
        self.pinned = true;
        Ok(())
    }

    /// Records `name` as the selection without pinning it. Ignored while an override is pinned.
    pub fn adopt(&mut self, name: &str) {
        if !self.pinned && !name.trim().is_empty() {
            info!(model = %name, "model selected from catalog");
            self.selected = Some(name.trim().to_string());
        }
    }

    /// Drops a pinned override so the next [`refresh`](Self::refresh) ranks again.
    pub fn clear_override(&mut self) {
        self.pinned = false;
    }

    /// The current selection, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Re-ranks and records the result unless an override is pinned.
    ///
    /// An empty catalog leaves an existing selection alone and records nothing.
    pub fn refresh(&mut self, catalog: &[String], available_memory_gb: f64) -> Option<&str> {
        if !self.pinned && !catalog.is_empty() {
            let choice = self.select_optimal(catalog, available_memory_gb);
            if self.selected.as_deref() != Some(choice.as_str()) {
                info!(model = %choice, available_gb = available_memory_gb, "model selected");
            }
            self.selected = Some(choice);
        }
        self.selected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_config::model::SelectionPolicyConfig;

    fn catalog(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn selector() -> ModelSelector {
        ModelSelector::new(builtin_policies(), "llama3.2")
    }

    #[test]
    fn empty_catalog_returns_default() {
        assert_eq!(selector().select_optimal(&[], 8.0), "llama3.2");
    }

    #[test]
    fn insufficient_memory_falls_back_to_first_entry() {
        assert_eq!(
            selector().select_optimal(&catalog(&["mistral:7b"]), 4.0),
            "mistral:7b"
        );
    }

    #[test]
    fn sufficient_memory_selects_match() {
        assert_eq!(
            selector().select_optimal(&catalog(&["mistral:7b"]), 16.0),
            "mistral:7b"
        );
    }

    #[test]
    fn highest_eligible_priority_wins() {
        let models = catalog(&["tinyllama", "phi3:mini", "mistral:7b"]);
        assert_eq!(selector().select_optimal(&models, 16.0), "mistral:7b");
        assert_eq!(selector().select_optimal(&models, 8.0), "phi3:mini");
        assert_eq!(selector().select_optimal(&models, 2.0), "tinyllama");
    }

    #[test]
    fn no_table_match_returns_first_entry() {
        let models = catalog(&["qwen2:7b", "deepseek-coder"]);
        assert_eq!(selector().select_optimal(&models, 64.0), "qwen2:7b");
    }

    #[test]
    fn exact_match_preferred_over_prefix() {
        let selector = ModelSelector::new(vec![SelectionPolicy::new("phi3", 0.0, 1)], "d");
        let models = catalog(&["phi3:medium", "phi3"]);
        assert_eq!(selector.select_optimal(&models, 8.0), "phi3");
    }

    #[test]
    fn substring_match_is_accepted() {
        let selector = ModelSelector::new(vec![SelectionPolicy::new("mistral", 0.0, 1)], "d");
        let models = catalog(&["other", "library/mistral:latest"]);
        assert_eq!(selector.select_optimal(&models, 8.0), "library/mistral:latest");
    }

    #[test]
    fn non_exact_matches_follow_catalog_order() {
        let selector = ModelSelector::new(vec![SelectionPolicy::new("phi3", 0.0, 1)], "d");
        let models = catalog(&["gemma", "library/PHI3:mini", "phi3:medium"]);
        assert_eq!(selector.select_optimal(&models, 8.0), "library/PHI3:mini");
    }

    #[test]
    fn equal_priority_keeps_table_order() {
        let selector = ModelSelector::new(
            vec![
                SelectionPolicy::new("gemma", 0.0, 5),
                SelectionPolicy::new("phi3", 0.0, 5),
            ],
            "d",
        );
        let models = catalog(&["phi3", "gemma:2b"]);
        assert_eq!(selector.select_optimal(&models, 8.0), "gemma:2b");
    }

    #[test]
    fn override_wins_until_cleared() {
        let mut selector = selector();
        selector.set_selected("custom:latest").unwrap();
        let models = catalog(&["mistral:7b"]);
        assert_eq!(selector.refresh(&models, 32.0), Some("custom:latest"));

        selector.clear_override();
        assert_eq!(selector.refresh(&models, 32.0), Some("mistral:7b"));
    }

    #[test]
    fn adopt_does_not_replace_pinned_override() {
        let mut selector = selector();
        selector.adopt("phi3");
        assert_eq!(selector.selected(), Some("phi3"));
        assert!(!selector.is_pinned());

        selector.set_selected("gemma:2b").unwrap();
        selector.adopt("phi3");
        assert_eq!(selector.selected(), Some("gemma:2b"));
    }

    #[test]
    fn set_selected_rejects_blank() {
        let mut selector = selector();
        assert!(matches!(
            selector.set_selected("  "),
            Err(LumenError::InvalidArgument(_))
        ));
        assert!(selector.selected().is_none());
    }

    #[test]
    fn refresh_with_empty_catalog_keeps_selection() {
        let mut selector = selector();
        assert_eq!(selector.refresh(&[], 8.0), None);
        selector.refresh(&catalog(&["phi3"]), 8.0);
        assert_eq!(selector.refresh(&[], 8.0), Some("phi3"));
    }

    #[test]
    fn from_config_uses_custom_table_and_override() {
        let config = SelectionConfig {
            default_model: "fallback".into(),
            override_model: Some("pinned".into()),
            policies: vec![SelectionPolicyConfig {
                pattern: "qwen".into(),
                min_memory_gb: 4.0,
                priority: 1,
            }],
        };
        let selector = ModelSelector::from_config(&config);
        assert_eq!(selector.policies().len(), 1);
        assert_eq!(selector.default_model(), "fallback");
        assert_eq!(selector.selected(), Some("pinned"));
        assert!(selector.is_pinned());
    }

    #[test]
    fn from_config_defaults_to_builtin_table() {
        let selector = ModelSelector::from_config(&SelectionConfig::default());
        assert_eq!(selector.policies(), builtin_policies().as_slice());
        assert!(selector.selected().is_none());
    }

    proptest::proptest! {
        #[test]
        fn selection_is_in_catalog_or_default(
            names in proptest::collection::vec("[a-z0-9:.]{1,12}", 0..6),
            memory in 0.0f64..128.0,
        ) {
            let selector = selector();
            let choice = selector.select_optimal(&names, memory);
            if names.is_empty() {
                proptest::prop_assert_eq!(choice, "llama3.2");
            } else {
                proptest::prop_assert!(names.contains(&choice));
                proptest::prop_assert_eq!(&choice, &selector.select_optimal(&names, memory));
            }
        }
    }
}
