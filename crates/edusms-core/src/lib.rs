// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the EduSMS billing core.
//!
//! This crate provides the trait definitions, error type, and domain types
//! used throughout the workspace. The storage backend and the SMS vendor
//! implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::EduSmsError;
pub use types::{AdapterType, AlphabetClass, HealthStatus, SegmentResult};

pub use traits::{PluginAdapter, SmsVendor, StorageAdapter};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::types::{CallerContext, PageRequest, SmsMessage, TemplateType, UsedType};

    #[test]
    fn error_messages_name_the_failure() {
        let err = EduSmsError::RecipientNotFound {
            student_id: "st-1".into(),
        };
        assert_eq!(err.to_string(), "recipient not found: student st-1");

        let err = EduSmsError::not_found("payment", "p-9");
        assert_eq!(err.to_string(), "payment not found: p-9");

        let err = EduSmsError::Persistence {
            source: Box::new(std::io::Error::other("disk full")),
        };
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn send_failure_classification() {
        let failed = EduSmsError::SendFailed {
            message: "rejected".into(),
            source: None,
        };
        let timeout = EduSmsError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        assert!(failed.is_send_failure());
        assert!(timeout.is_send_failure());
        assert!(!EduSmsError::Validation("x".into()).is_send_failure());
    }

    #[test]
    fn segment_sizes_per_alphabet() {
        assert_eq!(AlphabetClass::Latin.segment_size(), 160);
        assert_eq!(AlphabetClass::Cyrillic.segment_size(), 70);
    }

    #[test]
    fn wire_names_are_screaming_snake_case() {
        assert_eq!(TemplateType::Action.to_string(), "ACTION");
        assert_eq!(TemplateType::from_str("TEMPLATE").unwrap(), TemplateType::Template);
        assert_eq!(UsedType::BySelf.to_string(), "BY_SELF");
        assert_eq!(AlphabetClass::Cyrillic.to_string(), "CYRILLIC");

        let json = serde_json::to_string(&TemplateType::Action).unwrap();
        assert_eq!(json, "\"ACTION\"");
        let parsed: UsedType = serde_json::from_str("\"BY_SELF\"").unwrap();
        assert_eq!(parsed, UsedType::BySelf);
    }

    #[test]
    fn page_request_bounds() {
        assert!(PageRequest::new(1, 20).validate().is_ok());
        assert!(PageRequest::new(0, 20).validate().is_err());
        assert!(PageRequest::new(1, 0).validate().is_err());
        assert!(PageRequest::new(1, types::MAX_PAGE_SIZE + 1).validate().is_err());
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn caller_without_company_is_rejected() {
        let ctx = CallerContext::default();
        assert!(matches!(
            ctx.require_company(),
            Err(EduSmsError::Validation(_))
        ));
        let ctx = CallerContext::new(7, "u-1", "Admin");
        assert_eq!(ctx.require_company().unwrap(), 7);
    }

    #[test]
    fn sms_message_keeps_its_parts() {
        let msg = SmsMessage::new("hello", "+998901234567");
        assert_eq!(msg.text(), "hello");
        assert_eq!(msg.recipient_phone(), "+998901234567");
    }

    #[test]
    fn all_trait_modules_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_sms_vendor<T: SmsVendor>() {}
    }
}
