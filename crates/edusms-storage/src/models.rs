// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types live in `edusms-core::types` so they can cross trait
//! boundaries; they are re-exported here for convenience.

pub use edusms_core::types::{
    Company, GroupInfo, Room, SmsPaymentTransaction, SmsTemplate, SmsUsageRecord, Student,
};
