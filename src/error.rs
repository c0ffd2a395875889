//! Error types for the Glava pipeline.
//!
//! Uses `thiserror` for structured error definitions. Note that the
//! translation subsystem never lets a [`TranslationFailure`] escape its
//! public API: failures are rendered into the output text so that a
//! partially-translated chapter is still a chapter.

use thiserror::Error;

/// Error type for configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse config file
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid config value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Config directory not found
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// A failed remote translation call.
///
/// The `Display` output of each variant is the exact diagnostic text that
/// callers see in place of translated prose. Plugins written against the
/// original pipeline look for the `HTTP error` and `Fetch failed:`
/// prefixes, so the wording here is part of the contract.
#[derive(Error, Debug)]
pub enum TranslationFailure {
    /// Server responded with a non-success status.
    #[error("HTTP error {status}: {status_text}\nError body:{body}")]
    Http {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Transport-level failure: DNS, connection refused, timeout.
    #[error("Fetch failed:{0}")]
    Transport(String),

    /// Response body did not have the expected shape (legacy endpoint).
    #[error("Unexpected response:{0}")]
    Malformed(String),
}

/// Result type alias using anyhow for application-level error handling.
pub type Result<T> = anyhow::Result<T>;
