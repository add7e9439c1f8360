// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level EduSMS configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EduSmsConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// SQLite backing store.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Eskiz SMS gateway credentials and retry policy.
    #[serde(default)]
    pub eskiz: EskizConfig,

    /// Send workflow limits.
    #[serde(default)]
    pub sending: SendingConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name reported in logs and `doctor` output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "edusms".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file. `:memory:` opens a private in-memory store.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "edusms.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Eskiz gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EskizConfig {
    /// Base URL of the Eskiz API, without trailing slash.
    #[serde(default = "default_eskiz_base_url")]
    pub base_url: String,

    /// Account email. `None` requires the `EDUSMS_ESKIZ_EMAIL` env var.
    #[serde(default)]
    pub email: Option<String>,

    /// Account password. `None` requires the `EDUSMS_ESKIZ_PASSWORD` env var.
    #[serde(default)]
    pub password: Option<String>,

    /// Sender id placed in the `from` field.
    #[serde(default = "default_sender")]
    pub sender: String,

    /// How long a fetched bearer token is reused before re-authenticating.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,

    /// Total send attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts after a transient vendor error.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for EskizConfig {
    fn default() -> Self {
        Self {
            base_url: default_eskiz_base_url(),
            email: None,
            password: None,
            sender: default_sender(),
            token_ttl_secs: default_token_ttl_secs(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_eskiz_base_url() -> String {
    "https://notify.eskiz.uz".to_string()
}

fn default_sender() -> String {
    "4546".to_string()
}

fn default_token_ttl_secs() -> u64 {
    // Eskiz tokens live 30 days; refresh a day early.
    29 * 24 * 60 * 60
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> u64 {
    15
}

/// Send workflow configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SendingConfig {
    /// Upper bound on one vendor send, retries included. Must cover
    /// `eskiz.max_attempts` x `eskiz.request_timeout_secs` plus backoff.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for SendingConfig {
    fn default() -> Self {
        Self {
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_send_timeout_secs() -> u64 {
    45
}
