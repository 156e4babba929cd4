// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for the Tessera SDK.

use thiserror::Error;

/// Result type using SdkError.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors that can occur when using the SDK.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Configuration error (missing or invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure (DNS, TLS, connect, HTTP timeout).
    ///
    /// Surfaced immediately; retry policy belongs to the transport, not here.
    #[error("transport error: {0}")]
    Transport(String),

    /// Service returned a non-2xx response with a structured error body.
    #[error("api error [{status} {code}]: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Workspace not found.
    #[error("workspace not found: {0}")]
    WorkspaceNotFound(String),

    /// Activity not found.
    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    /// Invalid input rejected before any remote call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Local I/O error (reading an archive or credentials file).
    #[error("io error: {0}")]
    Io(String),

    /// A status wait exceeded its deadline.
    #[error("timed out after {waited_ms}ms waiting for {entity} to reach {target}")]
    WaitTimeout {
        entity: String,
        target: String,
        waited_ms: u64,
    },

    /// A status wait observed a terminal failure status that can never
    /// equal the target.
    #[error("{entity} reached terminal status {status}")]
    WaitFailed { entity: String, status: String },

    /// A status wait was cancelled via its cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

impl SdkError {
    /// Check whether this is a not-found-style error, which best-effort
    /// cleanup treats as already-done.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SdkError::WorkspaceNotFound(_) | SdkError::ActivityNotFound(_)
        ) || matches!(self, SdkError::Api { status: 404, .. })
    }
}

impl From<reqwest::Error> for SdkError {
    fn from(err: reqwest::Error) -> Self {
        SdkError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        SdkError::Io(err.to_string())
    }
}
