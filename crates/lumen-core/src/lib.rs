// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lumen chat client.
//!
//! This crate provides the error taxonomy, the chat data model, and the
//! trait seams between the orchestration core and the inference server.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{require_non_blank, LumenError};
pub use types::{
    ChatMessage, ChatRole, ChatSession, FallbackReason, GenerateRequest, InferenceReply,
    LoadedModel, ProbeFailure, ProbeReport, Reachability, ReplySource, SessionId,
};

pub use traits::{
    AvailabilityProbe, GenerationBackend, InferenceService, ModelCatalog, PluginAdapter,
};
