// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the catalog client, gateway, and chat orchestrator.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::LumenError;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generates a fresh random session id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author of a chat message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// A single message in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: ChatRole,
    content: String,
    timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Creates a message stamped with the current time.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// A conversation bound to one model.
///
/// History only grows while the session is active. Once ended, every
/// mutating method fails with `InvalidState`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    id: SessionId,
    model_id: String,
    active: bool,
    history: Vec<ChatMessage>,
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    /// Creates a new active session with an empty history.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            id: SessionId::generate(),
            model_id: model_id.into(),
            active: true,
            history: Vec::new(),
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Messages in conversation order.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Appends a message to the end of the history.
    pub fn append(&mut self, message: ChatMessage) -> Result<(), LumenError> {
        self.ensure_active()?;
        self.history.push(message);
        Ok(())
    }

    /// Removes the most recent message if it has the given role.
    ///
    /// Returns the removed message. Used to undo a half-finished turn.
    pub fn retract_last(&mut self, role: ChatRole) -> Result<Option<ChatMessage>, LumenError> {
        self.ensure_active()?;
        if self.history.last().map(ChatMessage::role) == Some(role) {
            return Ok(self.history.pop());
        }
        Ok(None)
    }

    /// Moves the session to another model, keeping its history.
    pub fn rebind(&mut self, model_id: impl Into<String>) -> Result<(), LumenError> {
        self.ensure_active()?;
        self.model_id = model_id.into();
        Ok(())
    }

    /// Empties the history in place.
    pub fn clear(&mut self) -> Result<(), LumenError> {
        self.ensure_active()?;
        self.history.clear();
        Ok(())
    }

    /// Marks the session inactive and stamps the end time.
    ///
    /// Ending an already ended session keeps the original timestamp.
    pub fn end(&mut self) {
        if self.active {
            self.active = false;
            self.ended_at = Some(Utc::now());
        }
    }

    fn ensure_active(&self) -> Result<(), LumenError> {
        if !self.active {
            return Err(LumenError::InvalidState(format!(
                "chat session {} is not active",
                self.id
            )));
        }
        Ok(())
    }
}

/// Client-side bookkeeping for a model known to the inference server.
///
/// Not a handle to real compute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedModel {
    pub id: String,
    pub name: String,
    pub running: bool,
    pub created_at: DateTime<Utc>,
}

/// Why a health check failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeFailure {
    Timeout,
    ConnectionRefused,
    HttpError(u16),
    Other(String),
}

impl From<&LumenError> for ProbeFailure {
    fn from(err: &LumenError) -> Self {
        match err {
            LumenError::Timeout { .. } => Self::Timeout,
            LumenError::Unreachable { .. } => Self::ConnectionRefused,
            LumenError::HttpStatus { status, .. } => Self::HttpError(*status),
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::ConnectionRefused => write!(f, "connection refused"),
            Self::HttpError(status) => write!(f, "HTTP {status}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

/// Availability of the inference server as last observed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Reachability {
    /// No probe has completed yet.
    #[default]
    Unknown,
    Reachable,
    Unreachable(ProbeFailure),
}

impl Reachability {
    pub fn is_reachable(&self) -> bool {
        matches!(self, Self::Reachable)
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Reachable => write!(f, "reachable"),
            Self::Unreachable(failure) => write!(f, "unreachable ({failure})"),
        }
    }
}

/// Outcome of a single health probe.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub reachability: Reachability,
    /// Base address that answered, when reachable.
    pub endpoint: Option<String>,
    pub latency: Duration,
    pub observed_at: Instant,
}

impl ProbeReport {
    pub fn reachable(endpoint: impl Into<String>, latency: Duration) -> Self {
        Self {
            reachability: Reachability::Reachable,
            endpoint: Some(endpoint.into()),
            latency,
            observed_at: Instant::now(),
        }
    }

    pub fn unreachable(failure: ProbeFailure, latency: Duration) -> Self {
        Self {
            reachability: Reachability::Unreachable(failure),
            endpoint: None,
            latency,
            observed_at: Instant::now(),
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.reachability.is_reachable()
    }

    /// Age of this report.
    pub fn age(&self) -> Duration {
        self.observed_at.elapsed()
    }
}

/// A single-shot generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Why the gateway answered with a mock reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Unreachable,
    NoModel,
    Timeout,
    HttpStatus,
    Protocol,
}

impl FallbackReason {
    /// Maps an environment error to its fallback reason.
    pub fn from_error(err: &LumenError) -> Self {
        match err {
            LumenError::Timeout { .. } => Self::Timeout,
            LumenError::HttpStatus { .. } => Self::HttpStatus,
            LumenError::Unreachable { .. } => Self::Unreachable,
            _ => Self::Protocol,
        }
    }
}

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplySource {
    Model { model: String },
    Fallback(FallbackReason),
}

impl ReplySource {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

impl fmt::Display for ReplySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model { model } => write!(f, "{model}"),
            Self::Fallback(reason) => write!(f, "offline ({reason})"),
        }
    }
}

/// Text produced by the gateway together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceReply {
    pub text: String,
    pub source: ReplySource,
}
