// SPDX-FileCopyrightText: 2026 Chorus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Chorus part orchestration engine.

use thiserror::Error;

/// The primary error type used across all Chorus collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum ChorusError {
    /// Configuration errors (invalid TOML, out-of-range weights, missing ids).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generation transport errors (stream failure, timeout, malformed chunk).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Emotion/distress classifier errors.
    #[error("classifier error: {message}")]
    Classifier {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The host cancelled an in-flight operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ChorusError {
    /// Convenience constructor for a storage error from any error type.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ChorusError::Storage {
            source: Box::new(err),
        }
    }

    /// Convenience constructor for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        ChorusError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error came from the generation transport.
    pub fn is_transport(&self) -> bool {
        matches!(self, ChorusError::Provider { .. } | ChorusError::Timeout { .. })
    }
}
