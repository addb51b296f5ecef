// src/error.rs

//! Unified error handling for the outline synchronizer.

use std::fmt;

use thiserror::Error;

/// Result type alias for synchronizer operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request could not be sent or its body could not be read
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request to {url} failed with status {status}: {body}")]
    Transport { url: String, status: u16, body: String },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Outline path with a gap in its identifiers
    #[error("Invalid outline path: {0}")]
    InvalidPath(String),

    /// No node at the requested path
    #[error("No node at path {0}")]
    NodeNotFound(String),

    /// Operation needs an outline but none is loaded
    #[error("No outline loaded")]
    NotLoaded,

    /// Bulk approval found nothing eligible under the target
    #[error("Nothing to approve under {0}")]
    EmptyApprovalSet(String),

    /// Response belongs to a pairing that is no longer loaded
    #[error("Discarded response from generation {ticket}, session is at {current}")]
    StaleResponse { ticket: u64, current: u64 },

    /// Same operation is already in flight for this path
    #[error("{operation} already in progress for {path}")]
    Busy { operation: String, path: String },

    /// Apply requested without a selected version
    #[error("No version selected for {0}")]
    NoSelection(String),
}

impl AppError {
    /// Create a transport error from a failed response.
    pub fn transport(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid path error.
    pub fn invalid_path(message: impl fmt::Display) -> Self {
        Self::InvalidPath(message.to_string())
    }

    /// Create a node-not-found error.
    pub fn not_found(path: impl fmt::Display) -> Self {
        Self::NodeNotFound(path.to_string())
    }

    /// Create a busy error for an operation on a path.
    pub fn busy(operation: impl fmt::Display, path: impl fmt::Display) -> Self {
        Self::Busy {
            operation: operation.to_string(),
            path: path.to_string(),
        }
    }

    /// Network or HTTP-status failure, as opposed to a local condition.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Transport { .. })
    }

    /// Response arrived for an abandoned pairing.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleResponse { .. })
    }
}
