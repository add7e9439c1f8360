// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Eskiz SMS gateway adapter for EduSMS.
//!
//! This crate implements [`SmsVendor`] on top of the Eskiz HTTP API
//! (`notify.eskiz.uz`).

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use edusms_config::model::EskizConfig;
use edusms_core::error::EduSmsError;
use edusms_core::traits::{PluginAdapter, SmsVendor};
use edusms_core::types::{AdapterType, HealthStatus, SmsMessage};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::client::{EskizClient, EskizCredentials, RetryPolicy};

/// Eskiz vendor implementing [`SmsVendor`].
pub struct EskizVendor {
    client: EskizClient,
}

impl EskizVendor {
    /// Creates a vendor from the `[eskiz]` config section.
    ///
    /// Fails with `Config` when the account email or password is missing.
    pub fn new(config: &EskizConfig) -> Result<Self, EduSmsError> {
        let email = config
            .email
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| EduSmsError::Config("eskiz.email is not set".into()))?;
        let password = config
            .password
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EduSmsError::Config("eskiz.password is not set".into()))?;

        let client = EskizClient::new(
            &config.base_url,
            EskizCredentials {
                email,
                password: SecretString::from(password),
            },
            config.sender.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_token_ttl(Duration::from_secs(config.token_ttl_secs))
        .with_retry_policy(RetryPolicy {
            max_attempts: config.max_attempts,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        });

        info!(base_url = %config.base_url, sender = %config.sender, "Eskiz vendor initialized");
        Ok(Self { client })
    }

    pub fn client(&self) -> &EskizClient {
        &self.client
    }
}

#[async_trait]
impl PluginAdapter for EskizVendor {
    fn name(&self) -> &str {
        "eskiz"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Vendor
    }

    async fn health_check(&self) -> Result<HealthStatus, EduSmsError> {
        match self.client.authenticate().await {
            Ok(()) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl SmsVendor for EskizVendor {
    async fn send(&self, message: &SmsMessage) -> Result<(), EduSmsError> {
        let response = self
            .client
            .send_sms(message.recipient_phone(), message.text())
            .await?;
        debug!(vendor_id = ?response.id, "message handed to Eskiz");
        Ok(())
    }
}
