// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Lumen integration tests.
//!
//! Provides scripted adapters and a test harness for fast, deterministic
//! tests that never touch a real inference server.
//!
//! # Components
//!
//! - [`StaticCatalog`] - catalog returning a fixed, replaceable listing
//! - [`FixedProbe`] - prober reporting a fixed, switchable reachability
//! - [`ScriptedBackend`] - generation backend replaying queued outcomes
//! - [`ScriptedInference`] - inference service replaying queued replies
//! - [`TestHarness`] - gateway plus orchestrator wired to the fakes above

pub mod harness;
pub mod mock_adapters;
pub mod mock_inference;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_adapters::{FixedProbe, ScriptedBackend, StaticCatalog};
pub use mock_inference::{InferenceCall, ScriptedInference};
