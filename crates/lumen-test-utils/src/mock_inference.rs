// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted inference service for orchestrator tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use lumen_core::error::require_non_blank;
use lumen_core::traits::InferenceService;
use lumen_core::types::{InferenceReply, ReplySource};
use lumen_core::LumenError;

/// One recorded `infer_detailed` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceCall {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
}

/// Inference service that replays queued outcomes.
///
/// When the queue is empty, a `"scripted reply"` from the requested model is
/// returned. Blank prompts fail with `InvalidArgument` like the real gateway.
pub struct ScriptedInference {
    outcomes: Mutex<VecDeque<Result<InferenceReply, LumenError>>>,
    calls: Mutex<Vec<InferenceCall>>,
    entered: Arc<Notify>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedInference {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            entered: Arc::new(Notify::new()),
            gate: None,
        }
    }

    /// Each call waits for `gate` to be notified before answering.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Notified every time a call starts.
    pub fn entered(&self) -> Arc<Notify> {
        Arc::clone(&self.entered)
    }

    pub async fn push_reply(&self, reply: InferenceReply) {
        self.outcomes.lock().await.push_back(Ok(reply));
    }

    pub async fn push_text(&self, text: impl Into<String>) {
        let reply = InferenceReply {
            text: text.into(),
            source: ReplySource::Model {
                model: "scripted".into(),
            },
        };
        self.push_reply(reply).await;
    }

    pub async fn push_error(&self, error: LumenError) {
        self.outcomes.lock().await.push_back(Err(error));
    }

    pub async fn calls(&self) -> Vec<InferenceCall> {
        self.calls.lock().await.clone()
    }
}

impl Default for ScriptedInference {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceService for ScriptedInference {
    async fn infer_detailed(
        &self,
        model: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<InferenceReply, LumenError> {
        require_non_blank(prompt, "prompt")?;
        self.calls.lock().await.push(InferenceCall {
            model: model.to_string(),
            prompt: prompt.to_string(),
            max_tokens,
        });
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.outcomes.lock().await.pop_front().unwrap_or_else(|| {
            Ok(InferenceReply {
                text: "scripted reply".to_string(),
                source: ReplySource::Model {
                    model: model.to_string(),
                },
            })
        })
    }
}
