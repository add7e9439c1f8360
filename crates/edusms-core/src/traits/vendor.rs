// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS vendor trait for third-party delivery providers.

use async_trait::async_trait;

use crate::error::EduSmsError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SmsMessage;

/// Adapter for an external SMS delivery provider.
///
/// Implementations own their authentication state and retry policy. A
/// returned error means the message was not accepted for delivery and is
/// reported as [`EduSmsError::SendFailed`].
#[async_trait]
pub trait SmsVendor: PluginAdapter {
    /// Hands one message to the provider.
    async fn send(&self, message: &SmsMessage) -> Result<(), EduSmsError>;
}
