// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the storage, billing, and service crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::EduSmsError;

/// Action type of the system template that warns a company about a low balance.
pub const INSUFFICIENT_BALANCE_ALERT: &str = "INSUFFICIENT_BALANCE_ALERT";

/// Largest page a listing call may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Vendor,
}

// --- Messages and segments ---

/// One outbound SMS: final text plus the resolved recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    text: String,
    recipient_phone: String,
}

impl SmsMessage {
    pub fn new(text: impl Into<String>, recipient_phone: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            recipient_phone: recipient_phone.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn recipient_phone(&self) -> &str {
        &self.recipient_phone
    }
}

/// Character set a message is billed under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlphabetClass {
    /// GSM-style text, 160 characters per segment.
    Latin,
    /// Any text containing a Cyrillic code point, 70 characters per segment.
    Cyrillic,
}

impl AlphabetClass {
    /// Number of code points that fit in one billed segment.
    pub const fn segment_size(self) -> usize {
        match self {
            Self::Latin => 160,
            Self::Cyrillic => 70,
        }
    }
}

/// Alphabet classification and billed part count of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentResult {
    pub alphabet: AlphabetClass,
    pub segment_count: u32,
}

// --- Templates ---

/// Whether a template is a free-form body or a system notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateType {
    /// Sent automatically when an action fires (birthday, low balance, ...).
    Action,
    /// Reusable body picked by staff.
    Template,
}

/// A company-owned message template with embedded placeholder tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsTemplate {
    pub id: i64,
    pub company_id: i64,
    pub text: String,
    /// Set for `ACTION` templates, e.g. [`INSUFFICIENT_BALANCE_ALERT`].
    pub action_type: Option<String>,
    pub template_type: TemplateType,
    pub is_active: bool,
    /// Only meaningful for [`INSUFFICIENT_BALANCE_ALERT`].
    pub resend_count: i32,
    pub segment_count: u32,
    pub created_at: String,
}

/// Templates of one type for a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateListing {
    pub template_type: TemplateType,
    pub templates: Vec<SmsTemplate>,
    /// Resend count of the insufficient-balance alert (0 for `TEMPLATE` listings).
    pub insufficient_balance_resend_count: i32,
}

// --- Ledger and usage ---

/// How a usage record came to be.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsedType {
    /// Sent directly by a staff member.
    BySelf,
}

/// One delivered message, billed against the company balance. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsUsageRecord {
    pub id: String,
    pub company_id: i64,
    pub student_id: String,
    pub text: String,
    pub segment_count: u32,
    pub creator_id: String,
    pub creator_name: String,
    pub used_type: UsedType,
    pub sent_at: String,
}

/// A balance top-up. Deleting it reverses the granted segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsPaymentTransaction {
    pub id: String,
    pub company_id: i64,
    pub comment: String,
    pub sum_paid: f64,
    pub segments_granted: i64,
    pub created_at: String,
}

// --- Directory rows read by lookups ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub title: String,
    pub sms_balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub company_id: i64,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub company_id: i64,
    pub title: String,
}

/// A study group as seen by template rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    /// Lesson start time as displayed, e.g. `14:00`.
    pub start_time: String,
    /// Weekday names the group meets on.
    pub days: Vec<String>,
    pub room_id: Option<i64>,
}

// --- Caller-facing requests ---

/// 1-based pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Rejects page 0 and sizes outside `1..=MAX_PAGE_SIZE`.
    pub fn validate(&self) -> Result<(), EduSmsError> {
        if self.page == 0 {
            return Err(EduSmsError::Validation("page must be at least 1".into()));
        }
        if self.size == 0 || self.size > MAX_PAGE_SIZE {
            return Err(EduSmsError::Validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.size
            )));
        }
        Ok(())
    }

    /// Row offset for SQL `LIMIT .. OFFSET ..`.
    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 20 }
    }
}

/// Identity of the caller, as forwarded by the gateway from its auth layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerContext {
    pub company_id: Option<i64>,
    pub user_id: String,
    pub user_name: String,
}

impl CallerContext {
    pub fn new(company_id: i64, user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            company_id: Some(company_id),
            user_id: user_id.into(),
            user_name: user_name.into(),
        }
    }

    /// The caller's company, or a validation error when the gateway sent none.
    pub fn require_company(&self) -> Result<i64, EduSmsError> {
        self.company_id
            .ok_or_else(|| EduSmsError::Validation("company id is required".into()))
    }
}
