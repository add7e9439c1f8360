// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by storage and vendor implementations.

use async_trait::async_trait;

use crate::error::EduSmsError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for EduSMS adapters.
///
/// Every replaceable collaborator (the backing store, the SMS vendor)
/// provides identity and a health check so the binary can report on it.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, EduSmsError>;
}
