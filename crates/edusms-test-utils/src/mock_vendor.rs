// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SMS vendor for deterministic testing.
//!
//! `MockVendor` implements `SmsVendor` without any network I/O. Scripted
//! failures are popped from a FIFO queue; when the queue is empty every send
//! succeeds and is recorded.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use edusms_core::traits::{PluginAdapter, SmsVendor};
use edusms_core::types::{AdapterType, HealthStatus, SmsMessage};
use edusms_core::EduSmsError;

enum Scripted {
    Fail(String),
    Delay(Duration),
}

/// A mock vendor that records every accepted message.
#[derive(Clone, Default)]
pub struct MockVendor {
    sent: Arc<Mutex<Vec<SmsMessage>>>,
    script: Arc<Mutex<VecDeque<Scripted>>>,
}

impl MockVendor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next send fail with `SendFailed { message }`.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.script
            .lock()
            .await
            .push_back(Scripted::Fail(message.into()));
    }

    /// Make the next send sleep before succeeding.
    pub async fn delay_next(&self, delay: Duration) {
        self.script.lock().await.push_back(Scripted::Delay(delay));
    }

    /// Messages accepted so far, oldest first.
    pub async fn sent(&self) -> Vec<SmsMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockVendor {
    fn name(&self) -> &str {
        "mock-vendor"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Vendor
    }

    async fn health_check(&self) -> Result<HealthStatus, EduSmsError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SmsVendor for MockVendor {
    async fn send(&self, message: &SmsMessage) -> Result<(), EduSmsError> {
        let next = self.script.lock().await.pop_front();
        match next {
            Some(Scripted::Fail(reason)) => {
                return Err(EduSmsError::SendFailed {
                    message: reason,
                    source: None,
                });
            }
            Some(Scripted::Delay(delay)) => tokio::time::sleep(delay).await,
            None => {}
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_successful_sends() {
        let vendor = MockVendor::new();
        vendor
            .send(&SmsMessage::new("Hi", "+998901234567"))
            .await
            .unwrap();
        let sent = vendor.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text(), "Hi");
    }

    #[tokio::test]
    async fn scripted_failure_applies_once() {
        let vendor = MockVendor::new();
        vendor.fail_next("gateway down").await;
        let msg = SmsMessage::new("Hi", "+998901234567");

        let err = vendor.send(&msg).await.unwrap_err();
        assert!(err.to_string().contains("gateway down"));
        assert_eq!(vendor.sent_count().await, 0);

        vendor.send(&msg).await.unwrap();
        assert_eq!(vendor.sent_count().await, 1);
    }
}
