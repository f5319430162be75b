// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for TruthScan

use thiserror::Error;

/// Result type alias for TruthScan operations
pub type Result<T> = std::result::Result<T, TruthScanError>;

/// TruthScan error types
#[derive(Error, Debug)]
pub enum TruthScanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input rejected before any request is made (size, type, empty text)
    #[error("{0}")]
    Validation(String),

    /// Upload exceeds the limit for its media kind
    #[error("{0}")]
    TooLarge(String),

    /// Upload has a content type the endpoint does not accept
    #[error("{0}")]
    UnsupportedMedia(String),

    /// A third-party detection service failed or answered unexpectedly
    #[error("{provider} error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    /// The detection API answered with an error; the message is taken from its body
    #[error("{0}")]
    Api(String),

    #[error("Media error: {0}")]
    Media(String),

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl TruthScanError {
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }
}
