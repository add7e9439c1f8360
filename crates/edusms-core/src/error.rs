// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the EduSMS billing core.

use thiserror::Error;

/// The primary error type returned by every EduSMS component.
///
/// Callers (the gateway layer) map each variant to a transport-level status;
/// the variant itself is the tagged failure reason.
#[derive(Debug, Error)]
pub enum EduSmsError {
    /// The student addressed by a send has no resolvable phone number.
    #[error("recipient not found: student {student_id}")]
    RecipientNotFound { student_id: String },

    /// A ledger, template, or directory row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An atomic unit against the backing store failed and was rolled back.
    #[error("persistence error: {source}")]
    Persistence {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The SMS vendor rejected the message or was unreachable after retries.
    #[error("sms send failed: {message}")]
    SendFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Malformed or missing caller input (company id, page bounds, empty text).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration errors (invalid values, unusable vendor credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EduSmsError {
    /// Shorthand for a [`EduSmsError::NotFound`] with a displayable id.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true if this error means the vendor call did not deliver.
    pub fn is_send_failure(&self) -> bool {
        matches!(self, Self::SendFailed { .. } | Self::Timeout { .. })
    }
}
