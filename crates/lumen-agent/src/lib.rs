// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat orchestration for the Lumen chat client.
//!
//! - [`ChatOrchestrator`] owns sessions and sequences each turn
//! - [`InferenceGateway`] issues generation calls and degrades to offline replies
//! - [`MockResponder`] produces those offline replies

pub mod gateway;
pub mod mock;
pub mod orchestrator;

pub use gateway::{GatewaySettings, InferenceGateway, InitState, MemorySource};
pub use mock::{MockCategory, MockResponder};
pub use orchestrator::ChatOrchestrator;
