// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: non-empty paths, a usable vendor
//! URL, non-zero retry and timeout bounds, and a send timeout that leaves
//! room for every vendor attempt.

use crate::diagnostic::ConfigError;
use crate::model::EduSmsConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &EduSmsConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.service.log_level.to_ascii_lowercase().as_str()) {
        invalid(format!(
            "service.log_level `{}` must be one of {}",
            config.service.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        invalid("storage.database_path must not be empty".to_string());
    }

    let base_url = config.eskiz.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        invalid(format!(
            "eskiz.base_url `{base_url}` must start with http:// or https://"
        ));
    }

    if config.eskiz.sender.trim().is_empty() {
        invalid("eskiz.sender must not be empty".to_string());
    }

    if config.eskiz.max_attempts == 0 {
        invalid("eskiz.max_attempts must be at least 1".to_string());
    }

    if config.eskiz.request_timeout_secs == 0 {
        invalid("eskiz.request_timeout_secs must be at least 1".to_string());
    }

    if config.sending.send_timeout_secs == 0 {
        invalid("sending.send_timeout_secs must be at least 1".to_string());
    }

    let budget_ms = vendor_budget_ms(config);
    if budget_ms > config.sending.send_timeout_secs.saturating_mul(1000) {
        invalid(format!(
            "sending.send_timeout_secs ({}s) is shorter than eskiz.max_attempts x \
             eskiz.request_timeout_secs plus backoff ({budget_ms}ms); a late attempt \
             could be cut off after the gateway accepted it",
            config.sending.send_timeout_secs
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Worst-case time the vendor may spend on retried attempts of one send.
fn vendor_budget_ms(config: &EduSmsConfig) -> u64 {
    let attempts = u64::from(config.eskiz.max_attempts.max(1));
    attempts
        .saturating_mul(config.eskiz.request_timeout_secs.saturating_mul(1000))
        .saturating_add((attempts - 1).saturating_mul(config.eskiz.retry_backoff_ms))
}
