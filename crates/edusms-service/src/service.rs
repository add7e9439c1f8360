// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-facing SMS operations.
//!
//! [`SmsService`] is what the gateway calls after authenticating a request.
//! It validates the caller context and pagination, then delegates to the
//! ledger, the renderer, the send workflow, or the store.

use std::sync::Arc;
use std::time::Duration;

use edusms_billing::{
    compute_segments, now_timestamp, render, resolve_bindings, BalanceLedger, RenderContext,
};
use edusms_config::model::SendingConfig;
use edusms_core::types::{
    CallerContext, PageRequest, SmsPaymentTransaction, SmsTemplate, SmsUsageRecord,
    TemplateListing, TemplateType, INSUFFICIENT_BALANCE_ALERT,
};
use edusms_core::{EduSmsError, SegmentResult, SmsVendor, StorageAdapter};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::workflow::{SendReceipt, SendSmsRequest, SendSmsWorkflow};

/// Balance top-up issued by platform staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddSmsRequest {
    pub company_id: i64,
    #[serde(default)]
    pub comment: String,
    pub sum_paid: f64,
    pub segments: i64,
}

/// Create (`id: None`) or edit a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetTemplateRequest {
    #[serde(default)]
    pub id: Option<i64>,
    pub text: String,
    #[serde(default)]
    pub action_type: Option<String>,
    pub template_type: TemplateType,
    #[serde(default)]
    pub resend_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendSmsDirectlyRequest {
    pub student_id: String,
    pub message: String,
}

/// A rendered template and its billing size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub text: String,
    pub segments: SegmentResult,
}

/// Facade over the ledger, templates, rendering and direct sends.
#[derive(Clone)]
pub struct SmsService {
    storage: Arc<dyn StorageAdapter>,
    ledger: BalanceLedger,
    workflow: SendSmsWorkflow,
}

impl SmsService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        vendor: Arc<dyn SmsVendor>,
        sending: &SendingConfig,
    ) -> Self {
        let workflow = SendSmsWorkflow::new(
            Arc::clone(&storage),
            vendor,
            Duration::from_secs(sending.send_timeout_secs),
        );
        Self {
            ledger: BalanceLedger::new(Arc::clone(&storage)),
            storage,
            workflow,
        }
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    pub fn workflow(&self) -> &SendSmsWorkflow {
        &self.workflow
    }

    /// Usage log of the caller's company, newest first.
    pub async fn get_sms_logs(
        &self,
        ctx: &CallerContext,
        student_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<SmsUsageRecord>, EduSmsError> {
        let company_id = ctx.require_company()?;
        page.validate()?;
        let student_id = student_id.filter(|s| !s.is_empty());
        self.storage.list_usage(company_id, student_id, page).await
    }

    pub async fn add_sms(&self, request: &AddSmsRequest) -> Result<SmsPaymentTransaction, EduSmsError> {
        self.ledger
            .credit(
                request.company_id,
                &request.comment,
                request.sum_paid,
                request.segments,
            )
            .await
    }

    pub async fn delete_sms(&self, transaction_id: &str) -> Result<SmsPaymentTransaction, EduSmsError> {
        self.ledger.reverse(transaction_id).await
    }

    pub async fn get_sms_transactions(
        &self,
        company_id: i64,
        page: PageRequest,
    ) -> Result<Vec<SmsPaymentTransaction>, EduSmsError> {
        self.ledger.transactions(company_id, page).await
    }

    /// Templates of one type. `ACTION` listings also report how many times
    /// the low-balance alert is resent.
    pub async fn get_sms_templates(
        &self,
        ctx: &CallerContext,
        template_type: TemplateType,
    ) -> Result<TemplateListing, EduSmsError> {
        let company_id = ctx.require_company()?;
        let templates = self.storage.list_templates(company_id, template_type).await?;
        let insufficient_balance_resend_count = match template_type {
            TemplateType::Action => templates
                .iter()
                .find(|t| t.action_type.as_deref() == Some(INSUFFICIENT_BALANCE_ALERT))
                .map_or(0, |t| t.resend_count),
            TemplateType::Template => 0,
        };
        Ok(TemplateListing {
            template_type,
            templates,
            insufficient_balance_resend_count,
        })
    }

    /// Insert or update a template; the segment count is recomputed from the text.
    pub async fn set_sms_template(
        &self,
        ctx: &CallerContext,
        request: &SetTemplateRequest,
    ) -> Result<SmsTemplate, EduSmsError> {
        let company_id = ctx.require_company()?;
        if request.text.trim().is_empty() {
            return Err(EduSmsError::Validation("template text must not be empty".into()));
        }

        let (id, created_at, is_active) = match request.id {
            Some(id) => {
                let existing = self
                    .storage
                    .get_template(company_id, id)
                    .await?
                    .ok_or_else(|| EduSmsError::not_found("template", id))?;
                (existing.id, existing.created_at, existing.is_active)
            }
            None => (0, now_timestamp(), true),
        };

        let template = SmsTemplate {
            id,
            company_id,
            text: request.text.clone(),
            action_type: request.action_type.clone().filter(|a| !a.is_empty()),
            template_type: request.template_type,
            is_active,
            resend_count: request.resend_count,
            segment_count: compute_segments(&request.text).segment_count,
            created_at,
        };
        let id = self.storage.save_template(&template).await?;
        info!(company_id, template_id = id, template_type = %template.template_type, "template saved");

        self.storage
            .get_template(company_id, id)
            .await?
            .ok_or_else(|| EduSmsError::not_found("template", id))
    }

    /// Render a stored template with bindings looked up for `render_ctx`.
    pub async fn render_template(
        &self,
        ctx: &CallerContext,
        template_id: i64,
        render_ctx: &RenderContext,
    ) -> Result<RenderedMessage, EduSmsError> {
        let company_id = ctx.require_company()?;
        let template = self
            .storage
            .get_template(company_id, template_id)
            .await?
            .ok_or_else(|| EduSmsError::not_found("template", template_id))?;
        let bindings = resolve_bindings(self.storage.as_ref(), company_id, render_ctx).await;
        let (text, segments) = render(&template.text, &bindings);
        Ok(RenderedMessage { text, segments })
    }

    pub async fn send_sms_directly(
        &self,
        ctx: &CallerContext,
        request: &SendSmsDirectlyRequest,
    ) -> Result<SendReceipt, EduSmsError> {
        let company_id = ctx.require_company()?;
        self.workflow
            .send_directly(&SendSmsRequest {
                company_id,
                student_id: request.student_id.clone(),
                message: request.message.clone(),
                creator_id: ctx.user_id.clone(),
                creator_name: ctx.user_name.clone(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seeded_storage, RecordingVendor};

    async fn service(balance: i64) -> (SmsService, Arc<RecordingVendor>) {
        let storage = seeded_storage(balance).await;
        let vendor = Arc::new(RecordingVendor::default());
        let svc = SmsService::new(storage, vendor.clone(), &SendingConfig::default());
        (svc, vendor)
    }

    fn ctx() -> CallerContext {
        CallerContext::new(1, "admin-1", "Admin")
    }

    #[tokio::test]
    async fn missing_company_id_is_rejected() {
        let (svc, vendor) = service(10).await;
        let anon = CallerContext::default();
        let err = svc
            .get_sms_logs(&anon, None, PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EduSmsError::Validation(ref m) if m.contains("company id")));
        let err = svc
            .send_sms_directly(
                &anon,
                &SendSmsDirectlyRequest {
                    student_id: "stu-1".into(),
                    message: "Hi".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EduSmsError::Validation(_)));
        assert!(vendor.sent().is_empty());
    }

    #[tokio::test]
    async fn logs_are_filtered_by_student() {
        let (svc, _) = service(10).await;
        for student_id in ["stu-1", "stu-2", "stu-1"] {
            svc.send_sms_directly(
                &ctx(),
                &SendSmsDirectlyRequest {
                    student_id: student_id.into(),
                    message: "Hi".into(),
                },
            )
            .await
            .unwrap();
        }
        let page = PageRequest::default();
        assert_eq!(svc.get_sms_logs(&ctx(), None, page).await.unwrap().len(), 3);
        let mine = svc.get_sms_logs(&ctx(), Some("stu-1"), page).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.student_id == "stu-1" && r.creator_id == "admin-1"));
        // Empty filter means all students.
        assert_eq!(svc.get_sms_logs(&ctx(), Some(""), page).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn page_bounds_are_validated() {
        let (svc, _) = service(10).await;
        for page in [PageRequest::new(0, 10), PageRequest::new(1, 0), PageRequest::new(1, 101)] {
            assert!(matches!(
                svc.get_sms_logs(&ctx(), None, page).await.unwrap_err(),
                EduSmsError::Validation(_)
            ));
            assert!(matches!(
                svc.get_sms_transactions(1, page).await.unwrap_err(),
                EduSmsError::Validation(_)
            ));
        }
    }

    #[tokio::test]
    async fn add_then_delete_round_trips_balance() {
        let (svc, _) = service(3).await;
        let tx = svc
            .add_sms(&AddSmsRequest {
                company_id: 1,
                comment: "Click payment".into(),
                sum_paid: 120_000.0,
                segments: 500,
            })
            .await
            .unwrap();
        assert_eq!(svc.ledger().balance(1).await.unwrap(), 503);
        let listed = svc.get_sms_transactions(1, PageRequest::default()).await.unwrap();
        assert_eq!(listed[0].id, tx.id);

        svc.delete_sms(&tx.id).await.unwrap();
        assert_eq!(svc.ledger().balance(1).await.unwrap(), 3);
        assert!(matches!(
            svc.delete_sms(&tx.id).await.unwrap_err(),
            EduSmsError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn template_insert_update_and_listing() {
        let (svc, _) = service(0).await;
        let created = svc
            .set_sms_template(
                &ctx(),
                &SetTemplateRequest {
                    id: None,
                    text: "Hello (STUDENT)".into(),
                    action_type: None,
                    template_type: TemplateType::Template,
                    resend_count: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.segment_count, 1);
        assert!(created.is_active);

        let updated = svc
            .set_sms_template(
                &ctx(),
                &SetTemplateRequest {
                    id: Some(created.id),
                    text: "ж".repeat(71),
                    action_type: None,
                    template_type: TemplateType::Template,
                    resend_count: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.segment_count, 2);
        assert_eq!(updated.created_at, created.created_at);

        let listing = svc
            .get_sms_templates(&ctx(), TemplateType::Template)
            .await
            .unwrap();
        assert_eq!(listing.templates.len(), 1);
        assert_eq!(listing.insufficient_balance_resend_count, 0);
    }

    #[tokio::test]
    async fn action_listing_reports_resend_count() {
        let (svc, _) = service(0).await;
        svc.set_sms_template(
            &ctx(),
            &SetTemplateRequest {
                id: None,
                text: "Your SMS balance is low".into(),
                action_type: Some(INSUFFICIENT_BALANCE_ALERT.into()),
                template_type: TemplateType::Action,
                resend_count: 3,
            },
        )
        .await
        .unwrap();
        svc.set_sms_template(
            &ctx(),
            &SetTemplateRequest {
                id: None,
                text: "Happy birthday (STUDENT)".into(),
                action_type: Some("BIRTHDAY".into()),
                template_type: TemplateType::Action,
                resend_count: 0,
            },
        )
        .await
        .unwrap();

        let listing = svc.get_sms_templates(&ctx(), TemplateType::Action).await.unwrap();
        assert_eq!(listing.templates.len(), 2);
        assert_eq!(listing.insufficient_balance_resend_count, 3);
    }

    #[tokio::test]
    async fn updating_unknown_template_is_not_found() {
        let (svc, _) = service(0).await;
        let err = svc
            .set_sms_template(
                &ctx(),
                &SetTemplateRequest {
                    id: Some(404),
                    text: "x".into(),
                    action_type: None,
                    template_type: TemplateType::Template,
                    resend_count: 0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EduSmsError::NotFound { entity: "template", .. }));
    }

    #[tokio::test]
    async fn render_template_resolves_bindings() {
        let (svc, _) = service(0).await;
        let tpl = svc
            .set_sms_template(
                &ctx(),
                &SetTemplateRequest {
                    id: None,
                    text: "(STUDENT), (GROUP) starts at (TIME) in (ROOM). (LC)".into(),
                    action_type: None,
                    template_type: TemplateType::Template,
                    resend_count: 0,
                },
            )
            .await
            .unwrap();

        let rendered = svc
            .render_template(
                &ctx(),
                tpl.id,
                &RenderContext {
                    student_id: Some("stu-1".into()),
                    group_id: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(
            rendered.text,
            "Aziz, IELTS starts at 14:00 in Room 7. Bright Minds"
        );
        assert_eq!(rendered.segments.segment_count, 1);

        let err = svc
            .render_template(&ctx(), 999, &RenderContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EduSmsError::NotFound { .. }));
    }
}
