// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lumen chat client.
//!
//! Errors fall into two families. Usage errors (`InvalidArgument`, `NotFound`,
//! `InvalidState`) always reach the caller. Environment errors (`Unreachable`,
//! `Timeout`, `HttpStatus`, `Protocol`) describe the inference server and are
//! absorbed by the inference gateway's fallback path.

use std::time::Duration;

use thiserror::Error;

/// Boxed error source carried by environment variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Lumen crates.
#[derive(Debug, Error)]
pub enum LumenError {
    /// A required input was blank or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A session or model id is not known.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The operation is not permitted in the entity's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The inference server could not be reached (connection refused, DNS, reset).
    #[error("server unreachable at {endpoint}")]
    Unreachable {
        endpoint: String,
        #[source]
        source: Option<BoxError>,
    },

    /// An outbound call exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout {
        duration: Duration,
        #[source]
        source: Option<BoxError>,
    },

    /// The server answered with a non-2xx status.
    #[error("server returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The server answered but the payload was not what the protocol requires.
    #[error("protocol error: {message}")]
    Protocol {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LumenError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Shorthand for a `Protocol` error without a source.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true for failures caused by the inference server or the network.
    ///
    /// These are the only errors the gateway converts into mock replies.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            Self::Unreachable { .. }
                | Self::Timeout { .. }
                | Self::HttpStatus { .. }
                | Self::Protocol { .. }
        )
    }

    /// Returns true if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Fails with `InvalidArgument` when `value` is empty or whitespace-only.
pub fn require_non_blank(value: &str, what: &str) -> Result<(), LumenError> {
    if value.trim().is_empty() {
        return Err(LumenError::InvalidArgument(format!("{what} cannot be empty")));
    }
    Ok(())
}
