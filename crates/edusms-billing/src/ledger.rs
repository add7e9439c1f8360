// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Balance ledger for SMS top-ups.
//!
//! Each credit is recorded as a payment row and added to the company's
//! `sms_balance` in the same transaction; a reversal deletes the row and
//! subtracts the same amount. Reversals apply no floor, so a balance that was
//! already spent can go negative.

use std::sync::Arc;

use edusms_core::types::{PageRequest, SmsPaymentTransaction};
use edusms_core::{EduSmsError, StorageAdapter};
use tracing::info;

/// Current UTC time in the format stored on every row.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Credits and reversals against the backing store.
#[derive(Clone)]
pub struct BalanceLedger {
    storage: Arc<dyn StorageAdapter>,
}

impl BalanceLedger {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }

    /// Record a top-up of `segments` for a company.
    pub async fn credit(
        &self,
        company_id: i64,
        comment: &str,
        sum_paid: f64,
        segments: i64,
    ) -> Result<SmsPaymentTransaction, EduSmsError> {
        if segments <= 0 {
            return Err(EduSmsError::Validation(format!(
                "segments must be positive, got {segments}"
            )));
        }
        if !sum_paid.is_finite() || sum_paid < 0.0 {
            return Err(EduSmsError::Validation(format!(
                "sum paid must be a non-negative amount, got {sum_paid}"
            )));
        }

        let payment = SmsPaymentTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            company_id,
            comment: comment.to_string(),
            sum_paid,
            segments_granted: segments,
            created_at: now_timestamp(),
        };
        self.storage.credit_payment(&payment).await?;

        info!(
            company_id,
            transaction_id = %payment.id,
            segments,
            sum_paid,
            "balance credited"
        );
        Ok(payment)
    }

    /// Undo a top-up and return the removed row.
    pub async fn reverse(&self, transaction_id: &str) -> Result<SmsPaymentTransaction, EduSmsError> {
        let payment = self.storage.reverse_payment(transaction_id).await?;
        info!(
            company_id = payment.company_id,
            transaction_id,
            segments = payment.segments_granted,
            "payment reversed"
        );
        Ok(payment)
    }

    /// Current balance; `NotFound` for an unknown company.
    pub async fn balance(&self, company_id: i64) -> Result<i64, EduSmsError> {
        self.storage
            .company_balance(company_id)
            .await?
            .ok_or_else(|| EduSmsError::not_found("company", company_id))
    }

    /// Payments of a company, newest first.
    pub async fn transactions(
        &self,
        company_id: i64,
        page: PageRequest,
    ) -> Result<Vec<SmsPaymentTransaction>, EduSmsError> {
        page.validate()?;
        self.storage.list_payments(company_id, page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edusms_config::model::StorageConfig;
    use edusms_core::types::Company;
    use edusms_storage::queries::directory;
    use edusms_storage::SqliteStorage;

    async fn ledger_with_company(balance: i64) -> BalanceLedger {
        let storage = SqliteStorage::new(StorageConfig {
            database_path: ":memory:".into(),
            wal_mode: false,
        });
        storage.initialize().await.unwrap();
        directory::insert_company(
            storage.database().unwrap(),
            &Company {
                id: 1,
                title: "Bright Minds".into(),
                sms_balance: balance,
            },
        )
        .await
        .unwrap();
        BalanceLedger::new(Arc::new(storage))
    }

    #[tokio::test]
    async fn credit_then_reverse_restores_balance() {
        let ledger = ledger_with_company(5).await;
        let tx = ledger.credit(1, "cash", 100_000.0, 100).await.unwrap();
        assert_eq!(ledger.balance(1).await.unwrap(), 105);
        assert_eq!(tx.segments_granted, 100);
        assert!(tx.created_at.ends_with('Z'));

        let removed = ledger.reverse(&tx.id).await.unwrap();
        assert_eq!(removed.id, tx.id);
        assert_eq!(ledger.balance(1).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn reverse_twice_is_not_found() {
        let ledger = ledger_with_company(0).await;
        let tx = ledger.credit(1, "", 0.0, 10).await.unwrap();
        ledger.reverse(&tx.id).await.unwrap();
        let err = ledger.reverse(&tx.id).await.unwrap_err();
        assert!(matches!(err, EduSmsError::NotFound { .. }));
        assert_eq!(ledger.balance(1).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn non_positive_segments_are_rejected() {
        let ledger = ledger_with_company(0).await;
        for segments in [0, -5] {
            let err = ledger.credit(1, "", 10.0, segments).await.unwrap_err();
            assert!(matches!(err, EduSmsError::Validation(_)));
        }
        let err = ledger.credit(1, "", -1.0, 5).await.unwrap_err();
        assert!(matches!(err, EduSmsError::Validation(_)));
        assert!(ledger
            .transactions(1, PageRequest::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_company_is_not_found() {
        let ledger = ledger_with_company(0).await;
        assert!(matches!(
            ledger.credit(9, "", 1.0, 1).await.unwrap_err(),
            EduSmsError::NotFound { .. }
        ));
        assert!(matches!(
            ledger.balance(9).await.unwrap_err(),
            EduSmsError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn concurrent_credits_sum_exactly() {
        let ledger = ledger_with_company(0).await;
        let mut handles = Vec::new();
        for _ in 0..25 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move { ledger.credit(1, "", 1.0, 4).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(ledger.balance(1).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn transactions_validates_page() {
        let ledger = ledger_with_company(0).await;
        let err = ledger
            .transactions(1, PageRequest::new(0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, EduSmsError::Validation(_)));
    }
}
