//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading
//! - Configuration validation
//! - Default value handling
//! - Secure API key storage via [`SecretString`]
//!
//! # Example
//!
//! ```
//! use lumina::config::{Config, SecretString, DEFAULT_MODEL};
//!
//! // Create a config directly (use Config::from_env() in production)
//! let config = Config {
//!     api_key: SecretString::new("example-key"),
//!     journal_path: "./data/journal.json".to_string(),
//!     log_level: "info".to_string(),
//!     request_timeout_ms: 30000,
//!     max_retries: 3,
//!     model: DEFAULT_MODEL.to_string(),
//! };
//!
//! // API key is protected from accidental logging
//! let debug = format!("{:?}", config);
//! assert!(debug.contains("<REDACTED>"));
//! assert!(!debug.contains("example-key"));
//! ```

mod secret;
mod validation;

pub use secret::SecretString;
pub use validation::{validate_config, MAX_RETRIES, MAX_TIMEOUT_MS, MIN_TIMEOUT_MS};

use crate::error::ConfigError;

pub use crate::provider::DEFAULT_MODEL;

/// Default journal file path.
pub const DEFAULT_JOURNAL_PATH: &str = "./data/journal.json";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default maximum retry attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Application configuration.
///
/// Use [`Config::from_env`] to load configuration from environment
/// variables. The `api_key` field uses [`SecretString`] to prevent
/// accidental logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gemini API key (protected from logging via [`SecretString`]).
    pub api_key: SecretString,
    /// Journal file path.
    pub journal_path: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Maximum retry attempts.
    pub max_retries: u32,
    /// Gemini model to use.
    pub model: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `GEMINI_API_KEY`: Gemini API key (`API_KEY` is accepted as a
    ///   fallback name)
    ///
    /// Optional environment variables (with defaults):
    /// - `JOURNAL_PATH`: Path to the journal file (default: `./data/journal.json`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `REQUEST_TIMEOUT_MS`: Request timeout (default: `30000`)
    /// - `MAX_RETRIES`: Maximum retry attempts (default: `3`)
    /// - `GEMINI_MODEL`: Model to use (default: `gemini-3-flash-preview`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - `GEMINI_API_KEY` is missing
    /// - `REQUEST_TIMEOUT_MS` or `MAX_RETRIES` is not a valid positive integer
    /// - Any value fails validation (see [`validate_config`])
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| ConfigError::MissingRequired {
                var: "GEMINI_API_KEY".into(),
            })?;

        let journal_path =
            std::env::var("JOURNAL_PATH").unwrap_or_else(|_| DEFAULT_JOURNAL_PATH.into());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let request_timeout_ms = parse_env_u64("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS)?;
        let max_retries = parse_env_u32("MAX_RETRIES", DEFAULT_MAX_RETRIES)?;

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let config = Self {
            api_key: SecretString::new(api_key),
            journal_path,
            log_level,
            request_timeout_ms,
            max_retries,
            model,
        };

        validate_config(&config)?;
        Ok(config)
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

/// Parse an environment variable as u32, using a default if not set.
fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    const ENV_VARS: &[&str] = &[
        "GEMINI_API_KEY",
        "API_KEY",
        "JOURNAL_PATH",
        "LOG_LEVEL",
        "REQUEST_TIMEOUT_MS",
        "MAX_RETRIES",
        "GEMINI_MODEL",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_missing_api_key() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { .. }));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("GEMINI_API_KEY", "test-key");

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_key.expose(), "test-key");
        assert_eq!(config.journal_path, DEFAULT_JOURNAL_PATH);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.max_retries, DEFAULT_MAX_RETRIES);
        assert_eq!(config.model, DEFAULT_MODEL);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_api_key_fallback_name() {
        clear_env();
        std::env::set_var("API_KEY", "fallback-key");

        let config = Config::from_env().unwrap();
        assert_eq!(config.api_key.expose(), "fallback-key");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("GEMINI_API_KEY", "test-key");
        std::env::set_var("JOURNAL_PATH", "/tmp/moods.json");
        std::env::set_var("REQUEST_TIMEOUT_MS", "5000");
        std::env::set_var("MAX_RETRIES", "1");
        std::env::set_var("GEMINI_MODEL", "gemini-custom");

        let config = Config::from_env().unwrap();
        assert_eq!(config.journal_path, "/tmp/moods.json");
        assert_eq!(config.request_timeout_ms, 5_000);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.model, "gemini-custom");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_timeout() {
        clear_env();
        std::env::set_var("GEMINI_API_KEY", "test-key");
        std::env::set_var("REQUEST_TIMEOUT_MS", "not-a-number");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_out_of_range_timeout() {
        clear_env();
        std::env::set_var("GEMINI_API_KEY", "test-key");
        std::env::set_var("REQUEST_TIMEOUT_MS", "10");

        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        clear_env();
    }

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = Config {
            api_key: SecretString::new("very-secret"),
            journal_path: DEFAULT_JOURNAL_PATH.into(),
            log_level: DEFAULT_LOG_LEVEL.into(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            model: DEFAULT_MODEL.into(),
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("<REDACTED>"));
        assert!(!debug.contains("very-secret"));
    }
}
