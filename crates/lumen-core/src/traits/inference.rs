// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inference service trait consumed by the chat orchestrator.

use async_trait::async_trait;

use crate::error::LumenError;
use crate::types::InferenceReply;

/// Produces a reply for a prompt, applying whatever fallback policy the
/// implementation carries.
#[async_trait]
pub trait InferenceService: Send + Sync + 'static {
    /// Returns the reply text and where it came from.
    ///
    /// Blank prompts fail with `InvalidArgument`.
    async fn infer_detailed(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<InferenceReply, LumenError>;

    /// Returns only the reply text.
    async fn infer(&self, model: &str, prompt: &str, max_tokens: u32) -> Result<String, LumenError> {
        self.infer_detailed(model, prompt, max_tokens)
            .await
            .map(|reply| reply.text)
    }
}
