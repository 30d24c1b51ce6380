//! Error types for the Lumina journal core.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`JournalError`]: Mood entry validation errors
//! - [`StorageError`]: Journal file persistence errors
//! - [`ProviderError`]: Gemini API specific errors
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.
//!
//! No error here is fatal to the process: insight and chat degrade to fixed
//! user-facing strings at their boundaries, a failed journal write leaves the
//! in-memory log authoritative, and a corrupt journal file is discarded at
//! startup.

use thiserror::Error;

/// Top-level application error.
///
/// This is the main error type returned by public API functions.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum AppError {
    /// Journal validation error.
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Gemini API error.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Journal validation errors.
///
/// The store refuses invalid input instead of persisting it; the surrounding
/// UI is expected to prevent these before they reach the core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JournalError {
    /// Mood score outside the closed 1-5 scale.
    #[error("Invalid mood score {score}: must be between 1 and 5")]
    InvalidScore {
        /// The rejected score value.
        score: u8,
    },
}

/// Journal persistence errors.
///
/// These errors represent failures reading or writing the single journal
/// record on disk. A write failure is a warning, not a hard error: the
/// in-memory log remains the source of truth for the rest of the process
/// lifetime.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failed to read the journal file.
    #[error("Journal read failed: {message}")]
    ReadFailed {
        /// Description of the read failure.
        message: String,
    },

    /// Failed to write the journal file.
    #[error("Journal write failed: {message}")]
    WriteFailed {
        /// Description of the write failure.
        message: String,
    },

    /// The persisted journal payload could not be parsed.
    #[error("Journal file corrupt: {message}")]
    Corrupt {
        /// Description of the parse failure.
        message: String,
    },
}

/// Gemini API errors.
///
/// These errors represent failures when communicating with the Gemini API.
/// They are always caught at the boundary of the insight and chat services
/// and converted to fixed user-facing fallback text; callers above those
/// services never see them as exceptions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Authentication failed due to a missing or invalid API key.
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Request was rate limited.
    #[error("Rate limited: retry after {retry_after_seconds}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_seconds: u64,
    },

    /// The requested model is overloaded or temporarily unavailable.
    #[error("Model overloaded: {model}")]
    ModelOverloaded {
        /// The model that is overloaded.
        model: String,
    },

    /// Request timed out.
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Invalid request parameters.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what's invalid.
        message: String,
    },

    /// Network communication error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error.
        message: String,
    },

    /// Unexpected response from the API.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Description of what was unexpected.
        message: String,
    },
}

impl ProviderError {
    /// Returns true if this error is retryable.
    ///
    /// Rate limiting, overload, timeout and network errors are retryable.
    /// Authentication and invalid request errors are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. }
                | Self::ModelOverloaded { .. }
                | Self::Timeout { .. }
                | Self::Network { .. }
        )
    }
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required configuration is missing.
    #[error("Missing required: {var}")]
    MissingRequired {
        /// The missing variable name.
        var: String,
    },

    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
