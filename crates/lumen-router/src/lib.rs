// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model selection for the Lumen chat client.
//!
//! This crate provides:
//! - [`ModelSelector`]: deterministic ranking of a model catalog against a
//!   static preference table and the host's available memory, with an
//!   explicit override
//! - [`available_memory_gb`]: host memory detection used as the ranking input

pub mod memory;
pub mod selector;

pub use memory::available_memory_gb;
pub use selector::{builtin_policies, ModelSelector, SelectionPolicy};
