// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat session bookkeeping and turn sequencing.
//!
//! The orchestrator is the only owner of the session table. A turn appends
//! the user message, releases the table while the inference call runs, then
//! appends the reply. One in-flight turn per session is assumed.

use std::collections::HashMap;
use std::sync::Arc;

use lumen_core::error::{require_non_blank, LumenError};
use lumen_core::traits::InferenceService;
use lumen_core::types::{ChatMessage, ChatRole, ChatSession, InferenceReply};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Owns chat sessions and drives each turn through an [`InferenceService`].
pub struct ChatOrchestrator {
    inference: Arc<dyn InferenceService>,
    sessions: RwLock<HashMap<String, ChatSession>>,
    max_tokens: u32,
}

impl ChatOrchestrator {
    pub fn new(inference: Arc<dyn InferenceService>, max_tokens: u32) -> Self {
        Self {
            inference,
            sessions: RwLock::new(HashMap::new()),
            max_tokens,
        }
    }

    /// Creates and stores a new active session bound to `model_id`.
    pub async fn start_session(&self, model_id: &str) -> Result<ChatSession, LumenError> {
        require_non_blank(model_id, "model id")?;
        let session = ChatSession::new(model_id.trim());
        info!(session_id = %session.id(), model = %session.model_id(), "chat session started");
        self.sessions
            .write()
            .await
            .insert(session.id().0.clone(), session.clone());
        Ok(session)
    }

    /// Sends `text` and returns the reply text.
    pub async fn send_message(&self, session_id: &str, text: &str) -> Result<String, LumenError> {
        self.send_message_detailed(session_id, text)
            .await
            .map(|reply| reply.text)
    }

    /// Sends `text` and returns the reply with its provenance.
    ///
    /// On success the history grows by exactly one user and one assistant
    /// message. If inference fails, the user message is taken back and the
    /// error is returned.
    pub async fn send_message_detailed(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<InferenceReply, LumenError> {
        let model_id = {
            let mut sessions = self.sessions.write().await;
            let session = lookup_mut(&mut sessions, session_id)?;
            if !session.is_active() {
                return Err(ended(session_id));
            }
            require_non_blank(text, "message")?;
            session.append(ChatMessage::user(text))?;
            session.model_id().to_string()
        };

        debug!(session_id, model = %model_id, "dispatching turn");
        let result = self
            .inference
            .infer_detailed(&model_id, text, self.max_tokens)
            .await;

        let mut sessions = self.sessions.write().await;
        let session = lookup_mut(&mut sessions, session_id)?;
        match result {
            Ok(reply) => {
                if !session.is_active() {
                    debug!(session_id, "session ended during inference, reply dropped");
                    return Err(ended(session_id));
                }
                session.append(ChatMessage::assistant(reply.text.clone()))?;
                debug!(session_id, source = %reply.source, "turn complete");
                Ok(reply)
            }
            Err(e) => {
                if session.is_active() {
                    session.retract_last(ChatRole::User)?;
                }
                Err(e)
            }
        }
    }

    /// Snapshot of an active session.
    pub async fn get_session(&self, session_id: &str) -> Result<ChatSession, LumenError> {
        let sessions = self.sessions.read().await;
        let session = lookup(&sessions, session_id)?;
        if !session.is_active() {
            return Err(ended(session_id));
        }
        Ok(session.clone())
    }

    /// Messages of an active session in conversation order.
    pub async fn get_history(&self, session_id: &str) -> Result<Vec<ChatMessage>, LumenError> {
        let sessions = self.sessions.read().await;
        let session = lookup(&sessions, session_id)?;
        if !session.is_active() {
            return Err(ended(session_id));
        }
        Ok(session.history().to_vec())
    }

    /// Empties the history of an active session in place.
    pub async fn clear_history(&self, session_id: &str) -> Result<(), LumenError> {
        let mut sessions = self.sessions.write().await;
        lookup_mut(&mut sessions, session_id)?.clear()?;
        debug!(session_id, "history cleared");
        Ok(())
    }

    /// Binds an active session to another model. History is kept.
    pub async fn rebind_session(&self, session_id: &str, model_id: &str) -> Result<(), LumenError> {
        require_non_blank(model_id, "model id")?;
        let mut sessions = self.sessions.write().await;
        let session = lookup_mut(&mut sessions, session_id)?;
        session.rebind(model_id.trim())?;
        info!(session_id, model = %session.model_id(), "chat session rebound");
        Ok(())
    }

    /// Marks the session inactive and returns its final state.
    ///
    /// Ending twice keeps the first end time.
    pub async fn end_session(&self, session_id: &str) -> Result<ChatSession, LumenError> {
        let mut sessions = self.sessions.write().await;
        let session = lookup_mut(&mut sessions, session_id)?;
        if session.is_active() {
            session.end();
            info!(session_id, messages = session.history().len(), "chat session ended");
        }
        Ok(session.clone())
    }

    /// Number of sessions that have not been ended.
    pub async fn active_session_count(&self) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_active())
            .count()
    }
}

fn lookup<'a>(
    sessions: &'a HashMap<String, ChatSession>,
    session_id: &str,
) -> Result<&'a ChatSession, LumenError> {
    sessions
        .get(session_id)
        .ok_or_else(|| LumenError::not_found("session", session_id))
}

fn lookup_mut<'a>(
    sessions: &'a mut HashMap<String, ChatSession>,
    session_id: &str,
) -> Result<&'a mut ChatSession, LumenError> {
    sessions
        .get_mut(session_id)
        .ok_or_else(|| LumenError::not_found("session", session_id))
}

fn ended(session_id: &str) -> LumenError {
    LumenError::InvalidState(format!("chat session {session_id} has ended"))
}
