// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the inference server's JSON API.

use serde::{Deserialize, Serialize};

/// Response of `GET /api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    pub models: Vec<TagEntry>,
}

/// One model descriptor in a listing. Only the name is read.
#[derive(Debug, Clone, Deserialize)]
pub struct TagEntry {
    #[serde(default)]
    pub name: Option<String>,
}

impl TagsResponse {
    /// Names of all descriptors that carry a non-blank name, in listing order.
    pub fn into_names(self) -> Vec<String> {
        self.models
            .into_iter()
            .filter_map(|entry| entry.name)
            .filter(|name| !name.trim().is_empty())
            .collect()
    }
}

/// Response of `GET /api/version`.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionResponse {
    #[serde(default)]
    pub version: Option<String>,
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateBody<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    /// Always false: replies are single-shot.
    pub stream: bool,
    pub num_predict: u32,
    pub temperature: f32,
}

/// Response of `POST /api/generate` with `stream = false`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
    /// Some servers report failures in-band with a 200 status.
    #[serde(default)]
    pub error: Option<String>,
}
