// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation backend trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::LumenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::GenerateRequest;

/// Issues the expensive, single-shot generation call.
#[async_trait]
pub trait GenerationBackend: PluginAdapter {
    /// Sends one generation request and returns the generated text.
    ///
    /// Makes exactly one attempt and never retries. Environment failures come
    /// back as `Unreachable`, `Timeout`, `HttpStatus`, or `Protocol`.
    async fn generate(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<String, LumenError>;
}
