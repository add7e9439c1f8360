// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand handlers. Each one calls a single [`SmsService`] operation and
//! prints the result as pretty JSON on stdout.

use std::sync::Arc;

use async_trait::async_trait;
use edusms_billing::{compute_segments, RenderContext};
use edusms_config::EduSmsConfig;
use edusms_core::types::{
    AdapterType, CallerContext, HealthStatus, PageRequest, SmsMessage, TemplateType,
};
use edusms_core::{EduSmsError, PluginAdapter, SmsVendor, StorageAdapter};
use edusms_eskiz::EskizVendor;
use edusms_service::{AddSmsRequest, SendSmsDirectlyRequest, SetTemplateRequest, SmsService};
use edusms_storage::SqliteStorage;
use serde::Serialize;
use tracing::{info, warn};

fn print_json<T: Serialize>(value: &T) -> Result<(), EduSmsError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| EduSmsError::Internal(format!("failed to encode output: {e}")))?;
    println!("{out}");
    Ok(())
}

pub fn parse_template_type(raw: &str) -> Result<TemplateType, EduSmsError> {
    raw.to_ascii_uppercase()
        .parse()
        .map_err(|_| EduSmsError::Validation(format!("unknown template type: {raw}")))
}

/// `edusms segments`. Needs no store.
pub fn segments(text: &str) -> Result<(), EduSmsError> {
    print_json(&compute_segments(text))
}

/// Stand-in vendor used when no Eskiz credentials are configured.
///
/// Every send fails, so nothing is billed; read-only commands keep working.
struct UnconfiguredVendor {
    reason: String,
}

#[async_trait]
impl PluginAdapter for UnconfiguredVendor {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Vendor
    }

    async fn health_check(&self) -> Result<HealthStatus, EduSmsError> {
        Ok(HealthStatus::Unhealthy(self.reason.clone()))
    }
}

#[async_trait]
impl SmsVendor for UnconfiguredVendor {
    async fn send(&self, _message: &SmsMessage) -> Result<(), EduSmsError> {
        Err(EduSmsError::Config(self.reason.clone()))
    }
}

/// The Eskiz vendor when credentials are present, otherwise a vendor that
/// refuses to send.
pub fn build_vendor(config: &EduSmsConfig) -> Arc<dyn SmsVendor> {
    match EskizVendor::new(&config.eskiz) {
        Ok(vendor) => Arc::new(vendor),
        Err(e) => {
            warn!(error = %e, "sms vendor unavailable, sends will fail");
            Arc::new(UnconfiguredVendor {
                reason: e.to_string(),
            })
        }
    }
}

/// An opened store plus the service built over it.
pub struct App {
    storage: Arc<SqliteStorage>,
    service: SmsService,
}

impl App {
    pub async fn open(config: &EduSmsConfig) -> Result<Self, EduSmsError> {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage = Arc::new(storage);
        let service = SmsService::new(
            Arc::clone(&storage) as Arc<dyn StorageAdapter>,
            build_vendor(config),
            &config.sending,
        );
        info!(database = %config.storage.database_path, "store opened");
        Ok(Self { storage, service })
    }

    pub async fn close(&self) -> Result<(), EduSmsError> {
        self.storage.close().await
    }

    pub async fn render(
        &self,
        ctx: &CallerContext,
        template_id: i64,
        render_ctx: &RenderContext,
    ) -> Result<(), EduSmsError> {
        print_json(&self.service.render_template(ctx, template_id, render_ctx).await?)
    }

    pub async fn credit(&self, request: &AddSmsRequest) -> Result<(), EduSmsError> {
        print_json(&self.service.add_sms(request).await?)
    }

    pub async fn reverse(&self, transaction_id: &str) -> Result<(), EduSmsError> {
        print_json(&self.service.delete_sms(transaction_id).await?)
    }

    pub async fn balance(&self, company_id: i64) -> Result<(), EduSmsError> {
        let balance = self.service.ledger().balance(company_id).await?;
        print_json(&serde_json::json!({ "company_id": company_id, "sms_balance": balance }))
    }

    pub async fn transactions(&self, company_id: i64, page: PageRequest) -> Result<(), EduSmsError> {
        print_json(&self.service.get_sms_transactions(company_id, page).await?)
    }

    pub async fn logs(
        &self,
        ctx: &CallerContext,
        student_id: Option<&str>,
        page: PageRequest,
    ) -> Result<(), EduSmsError> {
        print_json(&self.service.get_sms_logs(ctx, student_id, page).await?)
    }

    pub async fn templates(
        &self,
        ctx: &CallerContext,
        template_type: TemplateType,
    ) -> Result<(), EduSmsError> {
        print_json(&self.service.get_sms_templates(ctx, template_type).await?)
    }

    pub async fn set_template(
        &self,
        ctx: &CallerContext,
        request: &SetTemplateRequest,
    ) -> Result<(), EduSmsError> {
        print_json(&self.service.set_sms_template(ctx, request).await?)
    }

    pub async fn send(
        &self,
        ctx: &CallerContext,
        request: &SendSmsDirectlyRequest,
    ) -> Result<(), EduSmsError> {
        print_json(&self.service.send_sms_directly(ctx, request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edusms_config::model::StorageConfig;

    fn memory_config() -> EduSmsConfig {
        EduSmsConfig {
            storage: StorageConfig {
                database_path: ":memory:".into(),
                wal_mode: false,
            },
            ..EduSmsConfig::default()
        }
    }

    #[test]
    fn template_type_is_case_insensitive() {
        assert_eq!(parse_template_type("action").unwrap(), TemplateType::Action);
        assert_eq!(parse_template_type("TEMPLATE").unwrap(), TemplateType::Template);
        assert!(matches!(
            parse_template_type("promo"),
            Err(EduSmsError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn missing_credentials_fall_back_to_refusing_vendor() {
        let vendor = build_vendor(&memory_config());
        assert_eq!(vendor.name(), "unconfigured");
        let err = vendor
            .send(&SmsMessage::new("Hi", "+998901234567"))
            .await
            .unwrap_err();
        assert!(matches!(err, EduSmsError::Config(ref m) if m.contains("eskiz.email")));
    }

    #[tokio::test]
    async fn send_without_vendor_bills_nothing() {
        let app = App::open(&memory_config()).await.unwrap();
        let db = app.storage.database().unwrap();
        edusms_storage::queries::directory::insert_company(
            db,
            &edusms_core::types::Company {
                id: 1,
                title: "Bright Minds".into(),
                sms_balance: 5,
            },
        )
        .await
        .unwrap();
        edusms_storage::queries::directory::insert_student(
            db,
            &edusms_core::types::Student {
                id: "stu-1".into(),
                company_id: 1,
                name: "Aziz".into(),
                phone_number: "+998901234567".into(),
            },
        )
        .await
        .unwrap();

        let ctx = CallerContext::new(1, "admin-1", "Admin");
        let err = app
            .send(
                &ctx,
                &SendSmsDirectlyRequest {
                    student_id: "stu-1".into(),
                    message: "Hello".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_send_failure());
        assert_eq!(app.service.ledger().balance(1).await.unwrap(), 5);
        app.close().await.unwrap();
    }
}
