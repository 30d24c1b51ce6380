//! Configuration validation.

use super::Config;
use crate::error::ConfigError;

/// Minimum allowed request timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 1_000;
/// Maximum allowed request timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 600_000;
/// Maximum allowed retry attempts.
pub const MAX_RETRIES: u32 = 10;

/// Validate a loaded configuration.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] or [`ConfigError::MissingRequired`]
/// when a value is out of range or empty.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.api_key.is_empty() {
        return Err(ConfigError::MissingRequired {
            var: "GEMINI_API_KEY".into(),
        });
    }

    if config.request_timeout_ms < MIN_TIMEOUT_MS || config.request_timeout_ms > MAX_TIMEOUT_MS {
        return Err(ConfigError::InvalidValue {
            var: "REQUEST_TIMEOUT_MS".into(),
            reason: format!("must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"),
        });
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::InvalidValue {
            var: "MAX_RETRIES".into(),
            reason: format!("must be at most {MAX_RETRIES}"),
        });
    }

    if config.model.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "GEMINI_MODEL".into(),
            reason: "must not be empty".into(),
        });
    }

    if config.journal_path.is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "JOURNAL_PATH".into(),
            reason: "must not be empty".into(),
        });
    }

    Ok(())
}
