//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Device Channel Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Device connection error: {message}")]
    Connection { message: String },

    // ─────────────────────────────────────────────────────────────
    // Asset Library Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to list media assets: {message}")]
    AssetFetch { message: String },

    #[error("Upload error: {message}")]
    AssetUpload { message: String },

    #[error("HTTP error: {message}")]
    Http { message: String },

    // ─────────────────────────────────────────────────────────────
    // Editor Errors
    // ─────────────────────────────────────────────────────────────
    #[error("No app is open for editing")]
    NoDraft,

    #[error("Invalid edit: {message}")]
    InvalidEdit { message: String },

    #[error("Invalid date/time '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn asset_fetch(message: impl Into<String>) -> Self {
        Self::AssetFetch {
            message: message.into(),
        }
    }

    pub fn asset_upload(message: impl Into<String>) -> Self {
        Self::AssetUpload {
            message: message.into(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    pub fn invalid_edit(message: impl Into<String>) -> Self {
        Self::InvalidEdit {
            message: message.into(),
        }
    }

    pub fn invalid_timestamp(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Only a startup failure is fatal. Once the engine runs, the channel
    /// reconnects, the media list degrades and edits are rejected.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::ConfigNotFound { .. })
    }
}
