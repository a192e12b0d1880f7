// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the orchestration core and its collaborators.
//!
//! Every trait uses `#[async_trait]` so implementations can be held as
//! `Arc<dyn Trait>` and swapped for test doubles.

pub mod adapter;
pub mod backend;
pub mod catalog;
pub mod inference;
pub mod probe;

pub use adapter::PluginAdapter;
pub use backend::GenerationBackend;
pub use catalog::ModelCatalog;
pub use inference::InferenceService;
pub use probe::AvailabilityProbe;
