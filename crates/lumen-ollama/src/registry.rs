// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side bookkeeping of models known to the inference server.

use std::sync::Mutex;

use chrono::Utc;
use lumen_core::error::{require_non_blank, LumenError};
use lumen_core::types::LoadedModel;
use tracing::{debug, info};

/// Records models the client has loaded or seen in a listing.
///
/// Entries are kept in creation order. Nothing here touches the server.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Mutex<Vec<LoadedModel>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a load request for `name` and returns the new entry.
    pub fn load_model(&self, name: &str) -> Result<LoadedModel, LumenError> {
        require_non_blank(name, "model name")?;
        let model = new_entry(name.trim());
        info!(model = %model.name, id = %model.id, "model registered");
        self.lock().push(model.clone());
        Ok(model)
    }

    /// Removes the entry with `id` and returns it.
    pub fn unload_model(&self, id: &str) -> Result<LoadedModel, LumenError> {
        let mut models = self.lock();
        let index = models
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| LumenError::not_found("model", id))?;
        let removed = models.remove(index);
        info!(model = %removed.name, id = %removed.id, "model unregistered");
        Ok(removed)
    }

    /// Snapshot of all entries in creation order.
    pub fn loaded_models(&self) -> Vec<LoadedModel> {
        self.lock().clone()
    }

    /// Looks up an entry by model name.
    pub fn find_by_name(&self, name: &str) -> Option<LoadedModel> {
        self.lock().iter().find(|m| m.name == name).cloned()
    }

    /// Adds an entry for every listed name not yet recorded. Returns how many were added.
    pub fn sync_from_catalog(&self, names: &[String]) -> usize {
        let mut models = self.lock();
        let mut added = 0;
        for name in names {
            if name.trim().is_empty() || models.iter().any(|m| &m.name == name) {
                continue;
            }
            models.push(new_entry(name));
            added += 1;
        }
        if added > 0 {
            debug!(added, total = models.len(), "registry synced from catalog");
        }
        added
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LoadedModel>> {
        self.models
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn new_entry(name: &str) -> LoadedModel {
    LoadedModel {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        running: true,
        created_at: Utc::now(),
    }
}
