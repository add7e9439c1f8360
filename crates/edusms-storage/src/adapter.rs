// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use edusms_config::model::StorageConfig;
use edusms_core::types::{
    GroupInfo, PageRequest, SmsPaymentTransaction, SmsTemplate, SmsUsageRecord, TemplateType,
};
use edusms_core::{AdapterType, EduSmsError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// The opened database, for seeding the directory tables.
    pub fn database(&self) -> Result<&Database, EduSmsError> {
        self.db.get().ok_or_else(|| EduSmsError::Persistence {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, EduSmsError> {
        let db = self.database()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), EduSmsError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| EduSmsError::Persistence {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), EduSmsError> {
        let db = self.database()?;
        if self.config.wal_mode {
            db.connection()
                .call(|conn| -> Result<(), rusqlite::Error> {
                    conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                    Ok(())
                })
                .await
                .map_err(map_tr_err)?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }

    // --- Directory lookups ---

    async fn company_balance(&self, company_id: i64) -> Result<Option<i64>, EduSmsError> {
        queries::directory::company_balance(self.database()?, company_id).await
    }

    async fn company_name(&self, company_id: i64) -> Result<Option<String>, EduSmsError> {
        queries::directory::company_name(self.database()?, company_id).await
    }

    async fn student_phone(
        &self,
        company_id: i64,
        student_id: &str,
    ) -> Result<Option<String>, EduSmsError> {
        queries::directory::student_phone(self.database()?, company_id, student_id).await
    }

    async fn student_name(
        &self,
        company_id: i64,
        student_id: &str,
    ) -> Result<Option<String>, EduSmsError> {
        queries::directory::student_name(self.database()?, company_id, student_id).await
    }

    async fn group_info(
        &self,
        company_id: i64,
        group_id: i64,
    ) -> Result<Option<GroupInfo>, EduSmsError> {
        queries::directory::group_info(self.database()?, company_id, group_id).await
    }

    async fn room_name(&self, company_id: i64, room_id: i64) -> Result<Option<String>, EduSmsError> {
        queries::directory::room_name(self.database()?, company_id, room_id).await
    }

    // --- Ledger ---

    async fn credit_payment(&self, payment: &SmsPaymentTransaction) -> Result<(), EduSmsError> {
        queries::payments::credit_payment(self.database()?, payment).await
    }

    async fn reverse_payment(&self, id: &str) -> Result<SmsPaymentTransaction, EduSmsError> {
        queries::payments::reverse_payment(self.database()?, id).await
    }

    async fn list_payments(
        &self,
        company_id: i64,
        page: PageRequest,
    ) -> Result<Vec<SmsPaymentTransaction>, EduSmsError> {
        queries::payments::list_payments(self.database()?, company_id, page).await
    }

    // --- Usage ---

    async fn record_usage(&self, usage: &SmsUsageRecord) -> Result<(), EduSmsError> {
        queries::usage::record_usage(self.database()?, usage).await
    }

    async fn list_usage(
        &self,
        company_id: i64,
        student_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<SmsUsageRecord>, EduSmsError> {
        queries::usage::list_usage(self.database()?, company_id, student_id, page).await
    }

    // --- Templates ---

    async fn list_templates(
        &self,
        company_id: i64,
        template_type: TemplateType,
    ) -> Result<Vec<SmsTemplate>, EduSmsError> {
        queries::templates::list_templates(self.database()?, company_id, template_type).await
    }

    async fn get_template(
        &self,
        company_id: i64,
        id: i64,
    ) -> Result<Option<SmsTemplate>, EduSmsError> {
        queries::templates::get_template(self.database()?, company_id, id).await
    }

    async fn save_template(&self, template: &SmsTemplate) -> Result<i64, EduSmsError> {
        queries::templates::save_template(self.database()?, template).await
    }
}
