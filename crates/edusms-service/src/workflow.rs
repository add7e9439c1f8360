// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct send: resolve, segment, deliver, bill.
//!
//! The usage row is staged in memory while the vendor call runs and is only
//! written after the vendor accepted the message. The write inserts the usage
//! row and debits the company balance in one transaction, so a company is
//! never billed for a message that was not handed off, and the balance always
//! equals credits minus recorded usage.

use std::sync::Arc;
use std::time::Duration;

use edusms_billing::{compute_segments, now_timestamp};
use edusms_core::types::{SmsMessage, SmsUsageRecord, UsedType};
use edusms_core::{EduSmsError, SegmentResult, SmsVendor, StorageAdapter};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, error, info, warn};

/// States of one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SendState {
    Initiated,
    RecipientResolved,
    SegmentComputed,
    /// Usage staged, not yet durable.
    UsageRecorded,
    Sent,
    Failed,
}

/// A send on behalf of a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSmsRequest {
    pub company_id: i64,
    pub student_id: String,
    pub message: String,
    pub creator_id: String,
    pub creator_name: String,
}

/// Outcome of a delivered and billed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    pub usage: SmsUsageRecord,
    pub segments: SegmentResult,
}

/// Usage row waiting for the vendor result. Dropping it writes nothing.
#[derive(Debug)]
pub struct PendingUsage {
    record: SmsUsageRecord,
}

impl PendingUsage {
    fn stage(request: &SendSmsRequest, segments: SegmentResult) -> Self {
        Self {
            record: SmsUsageRecord {
                id: uuid::Uuid::new_v4().to_string(),
                company_id: request.company_id,
                student_id: request.student_id.clone(),
                text: request.message.clone(),
                segment_count: segments.segment_count,
                creator_id: request.creator_id.clone(),
                creator_name: request.creator_name.clone(),
                used_type: UsedType::BySelf,
                sent_at: now_timestamp(),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Insert the usage row and debit the balance atomically.
    async fn commit(self, storage: &dyn StorageAdapter) -> Result<SmsUsageRecord, EduSmsError> {
        storage.record_usage(&self.record).await?;
        Ok(self.record)
    }
}

/// Orchestrates a direct send against a store and a vendor.
#[derive(Clone)]
pub struct SendSmsWorkflow {
    storage: Arc<dyn StorageAdapter>,
    vendor: Arc<dyn SmsVendor>,
    send_timeout: Duration,
}

impl SendSmsWorkflow {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        vendor: Arc<dyn SmsVendor>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            vendor,
            send_timeout,
        }
    }

    /// Deliver `request.message` to the student and bill the company.
    ///
    /// Errors: `Validation` for empty text, `NotFound` for an unknown company,
    /// `RecipientNotFound` when the student has no phone in that company,
    /// `SendFailed` when the vendor rejects or times out (nothing written),
    /// `Persistence` when the message went out but billing could not be saved.
    pub async fn send_directly(&self, request: &SendSmsRequest) -> Result<SendReceipt, EduSmsError> {
        let mut state = SendState::Initiated;
        debug!(company_id = request.company_id, student_id = %request.student_id, %state, "send started");

        let result = self.run(request, &mut state).await;
        if let Err(e) = &result {
            let failed_in = state;
            state = SendState::Failed;
            warn!(
                company_id = request.company_id,
                student_id = %request.student_id,
                %failed_in,
                %state,
                error = %e,
                "send failed"
            );
        }
        result
    }

    async fn run(
        &self,
        request: &SendSmsRequest,
        state: &mut SendState,
    ) -> Result<SendReceipt, EduSmsError> {
        if request.message.trim().is_empty() {
            return Err(EduSmsError::Validation("message text must not be empty".into()));
        }
        if self.storage.company_balance(request.company_id).await?.is_none() {
            return Err(EduSmsError::not_found("company", request.company_id));
        }

        let phone = self
            .storage
            .student_phone(request.company_id, &request.student_id)
            .await?
            .ok_or_else(|| EduSmsError::RecipientNotFound {
                student_id: request.student_id.clone(),
            })?;
        advance(state, SendState::RecipientResolved);

        let segments = compute_segments(&request.message);
        advance(state, SendState::SegmentComputed);
        debug!(alphabet = %segments.alphabet, segments = segments.segment_count, "segments computed");

        let pending = PendingUsage::stage(request, segments);
        advance(state, SendState::UsageRecorded);
        debug!(usage_id = pending.id(), "usage staged");

        let message = SmsMessage::new(request.message.clone(), phone);
        match tokio::time::timeout(self.send_timeout, self.vendor.send(&message)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(into_send_failed(e)),
            Err(_elapsed) => {
                return Err(EduSmsError::SendFailed {
                    message: format!(
                        "vendor did not answer within {}s",
                        self.send_timeout.as_secs()
                    ),
                    source: Some(Box::new(EduSmsError::Timeout {
                        duration: self.send_timeout,
                    })),
                });
            }
        }

        let usage_id = pending.id().to_string();
        let usage = pending.commit(self.storage.as_ref()).await.map_err(|e| {
            error!(
                usage_id = %usage_id,
                company_id = request.company_id,
                error = %e,
                "message sent but usage could not be recorded"
            );
            match e {
                EduSmsError::Persistence { .. } => e,
                other => EduSmsError::Persistence {
                    source: Box::new(other),
                },
            }
        })?;
        advance(state, SendState::Sent);

        info!(
            company_id = usage.company_id,
            usage_id = %usage.id,
            segments = usage.segment_count,
            "sms sent"
        );
        Ok(SendReceipt { usage, segments })
    }
}

fn advance(state: &mut SendState, next: SendState) {
    debug!(from = %state, to = %next, "send state");
    *state = next;
}

fn into_send_failed(e: EduSmsError) -> EduSmsError {
    match e {
        EduSmsError::SendFailed { .. } => e,
        other => EduSmsError::SendFailed {
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seeded_storage, FailingCommitStorage, RecordingVendor, SlowVendor};
    use edusms_core::types::PageRequest;
    use edusms_core::AlphabetClass;

    fn request(student_id: &str, message: &str) -> SendSmsRequest {
        SendSmsRequest {
            company_id: 1,
            student_id: student_id.into(),
            message: message.into(),
            creator_id: "admin-1".into(),
            creator_name: "Admin".into(),
        }
    }

    fn workflow(storage: Arc<dyn StorageAdapter>, vendor: Arc<dyn SmsVendor>) -> SendSmsWorkflow {
        SendSmsWorkflow::new(storage, vendor, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn success_records_usage_and_debits() {
        let storage = seeded_storage(50).await;
        let vendor = Arc::new(RecordingVendor::default());
        let wf = workflow(storage.clone(), vendor.clone());

        let receipt = wf
            .send_directly(&request("stu-1", &"a".repeat(161)))
            .await
            .unwrap();
        assert_eq!(receipt.segments.segment_count, 2);
        assert_eq!(receipt.usage.used_type, UsedType::BySelf);
        assert_eq!(receipt.usage.creator_name, "Admin");

        let sent = vendor.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient_phone(), "+998901234567");

        assert_eq!(storage.company_balance(1).await.unwrap(), Some(48));
        let logs = storage.list_usage(1, None, PageRequest::default()).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, receipt.usage.id);
    }

    #[tokio::test]
    async fn unknown_student_fails_before_any_write() {
        let storage = seeded_storage(50).await;
        let vendor = Arc::new(RecordingVendor::default());
        let wf = workflow(storage.clone(), vendor.clone());

        let err = wf.send_directly(&request("ghost", "Hi")).await.unwrap_err();
        assert!(matches!(err, EduSmsError::RecipientNotFound { ref student_id } if student_id == "ghost"));
        assert!(vendor.sent().is_empty());
        assert_eq!(storage.company_balance(1).await.unwrap(), Some(50));
    }

    #[tokio::test]
    async fn student_without_phone_is_recipient_not_found() {
        let storage = seeded_storage(50).await;
        let wf = workflow(storage, Arc::new(RecordingVendor::default()));
        let err = wf.send_directly(&request("stu-nophone", "Hi")).await.unwrap_err();
        assert!(matches!(err, EduSmsError::RecipientNotFound { .. }));
    }

    #[tokio::test]
    async fn vendor_failure_writes_nothing() {
        let storage = seeded_storage(50).await;
        let vendor = Arc::new(RecordingVendor::failing());
        let wf = workflow(storage.clone(), vendor);

        let err = wf.send_directly(&request("stu-1", "Hi")).await.unwrap_err();
        assert!(matches!(err, EduSmsError::SendFailed { .. }));
        assert_eq!(storage.company_balance(1).await.unwrap(), Some(50));
        assert!(storage
            .list_usage(1, None, PageRequest::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn slow_vendor_times_out_as_send_failure() {
        let storage = seeded_storage(50).await;
        let wf = SendSmsWorkflow::new(
            storage.clone(),
            Arc::new(SlowVendor(Duration::from_secs(60))),
            Duration::from_millis(20),
        );
        let err = wf.send_directly(&request("stu-1", "Hi")).await.unwrap_err();
        assert!(err.is_send_failure());
        assert!(err.to_string().contains("did not answer"));
        assert_eq!(storage.company_balance(1).await.unwrap(), Some(50));
    }

    #[tokio::test]
    async fn commit_failure_after_send_is_persistence_error() {
        let storage = seeded_storage(50).await;
        let vendor = Arc::new(RecordingVendor::default());
        let wf = workflow(
            Arc::new(FailingCommitStorage(storage.clone())),
            vendor.clone(),
        );

        let err = wf.send_directly(&request("stu-1", "Hi")).await.unwrap_err();
        assert!(matches!(err, EduSmsError::Persistence { .. }));
        assert!(!err.is_send_failure());
        assert_eq!(vendor.sent().len(), 1);
        assert_eq!(storage.company_balance(1).await.unwrap(), Some(50));
        assert!(storage
            .list_usage(1, None, PageRequest::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn empty_message_is_validation_error() {
        let storage = seeded_storage(50).await;
        let vendor = Arc::new(RecordingVendor::default());
        let wf = workflow(storage, vendor.clone());
        let err = wf.send_directly(&request("stu-1", "   ")).await.unwrap_err();
        assert!(matches!(err, EduSmsError::Validation(_)));
        assert!(vendor.sent().is_empty());
    }

    #[tokio::test]
    async fn unknown_company_is_not_found() {
        let storage = seeded_storage(50).await;
        let wf = workflow(storage, Arc::new(RecordingVendor::default()));
        let mut req = request("stu-1", "Hi");
        req.company_id = 99;
        let err = wf.send_directly(&req).await.unwrap_err();
        assert!(matches!(err, EduSmsError::NotFound { entity: "company", .. }));
    }

    #[tokio::test]
    async fn cyrillic_message_is_billed_at_seventy() {
        let storage = seeded_storage(10).await;
        let wf = workflow(storage.clone(), Arc::new(RecordingVendor::default()));
        let receipt = wf
            .send_directly(&request("stu-1", &"д".repeat(71)))
            .await
            .unwrap();
        assert_eq!(receipt.segments.alphabet, AlphabetClass::Cyrillic);
        assert_eq!(storage.company_balance(1).await.unwrap(), Some(8));
    }

    #[tokio::test]
    async fn sends_are_not_blocked_by_low_balance() {
        let storage = seeded_storage(0).await;
        let wf = workflow(storage.clone(), Arc::new(RecordingVendor::default()));
        wf.send_directly(&request("stu-1", "Hi")).await.unwrap();
        assert_eq!(storage.company_balance(1).await.unwrap(), Some(-1));
    }

    #[test]
    fn state_names() {
        assert_eq!(SendState::RecipientResolved.to_string(), "recipient_resolved");
        assert_eq!(SendState::Failed.to_string(), "failed");
    }
}
