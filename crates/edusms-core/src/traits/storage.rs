// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the relational backing store.

use async_trait::async_trait;

use crate::error::EduSmsError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    GroupInfo, PageRequest, SmsPaymentTransaction, SmsTemplate, SmsUsageRecord, TemplateType,
};

/// Adapter for the backing store.
///
/// Every method that mutates `sms_balance` does so in the same atomic unit
/// as the ledger row it pairs with; an error means nothing was written.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), EduSmsError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), EduSmsError>;

    // --- Directory lookups ---

    /// Current `sms_balance` of a company, `None` if the company is unknown.
    async fn company_balance(&self, company_id: i64) -> Result<Option<i64>, EduSmsError>;

    async fn company_name(&self, company_id: i64) -> Result<Option<String>, EduSmsError>;

    /// Phone number of a student that belongs to the given company.
    async fn student_phone(
        &self,
        company_id: i64,
        student_id: &str,
    ) -> Result<Option<String>, EduSmsError>;

    /// Rows of other companies read as missing in the scoped lookups below.
    async fn student_name(
        &self,
        company_id: i64,
        student_id: &str,
    ) -> Result<Option<String>, EduSmsError>;

    async fn group_info(
        &self,
        company_id: i64,
        group_id: i64,
    ) -> Result<Option<GroupInfo>, EduSmsError>;

    async fn room_name(&self, company_id: i64, room_id: i64) -> Result<Option<String>, EduSmsError>;

    // --- Ledger ---

    /// Inserts the payment row and adds its segments to the company balance.
    ///
    /// Fails with `NotFound` (nothing written) if the company does not exist.
    async fn credit_payment(&self, payment: &SmsPaymentTransaction) -> Result<(), EduSmsError>;

    /// Deletes a payment row and subtracts its segments from the balance.
    ///
    /// Returns the deleted row; `NotFound` if no such payment exists.
    async fn reverse_payment(&self, id: &str) -> Result<SmsPaymentTransaction, EduSmsError>;

    /// Payments of a company, newest first.
    async fn list_payments(
        &self,
        company_id: i64,
        page: PageRequest,
    ) -> Result<Vec<SmsPaymentTransaction>, EduSmsError>;

    // --- Usage ---

    /// Inserts a usage record and debits its segments from the balance.
    ///
    /// Fails with `NotFound` (nothing written) if the company does not exist.
    async fn record_usage(&self, usage: &SmsUsageRecord) -> Result<(), EduSmsError>;

    /// Usage records of a company, optionally narrowed to one student, newest first.
    async fn list_usage(
        &self,
        company_id: i64,
        student_id: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<SmsUsageRecord>, EduSmsError>;

    // --- Templates ---

    async fn list_templates(
        &self,
        company_id: i64,
        template_type: TemplateType,
    ) -> Result<Vec<SmsTemplate>, EduSmsError>;

    async fn get_template(
        &self,
        company_id: i64,
        id: i64,
    ) -> Result<Option<SmsTemplate>, EduSmsError>;

    /// Inserts a template when `id == 0`, otherwise updates the existing row.
    ///
    /// `is_active` is never written by this call. Returns the template id.
    async fn save_template(&self, template: &SmsTemplate) -> Result<i64, EduSmsError>;
}
