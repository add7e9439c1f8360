// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full service stack with a [`MockVendor`] and a
//! temp SQLite database seeded with one company, two students, a room and a
//! study group.

use std::sync::Arc;

use edusms_config::model::{SendingConfig, StorageConfig};
use edusms_core::types::{CallerContext, Company, GroupInfo, Room, Student};
use edusms_core::{EduSmsError, StorageAdapter};
use edusms_service::SmsService;
use edusms_storage::queries::directory;
use edusms_storage::SqliteStorage;

use crate::mock_vendor::MockVendor;

/// Id of the seeded company.
pub const COMPANY_ID: i64 = 1;
/// Seeded student with a phone number.
pub const STUDENT_ID: &str = "stu-1";
/// Second seeded student, also with a phone number.
pub const OTHER_STUDENT_ID: &str = "stu-2";
/// Seeded study group (room [`ROOM_ID`]).
pub const GROUP_ID: i64 = 3;
pub const ROOM_ID: i64 = 7;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    initial_balance: i64,
    send_timeout_secs: u64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            initial_balance: 0,
            send_timeout_secs: SendingConfig::default().send_timeout_secs,
        }
    }

    /// Starting `sms_balance` of the seeded company.
    pub fn with_balance(mut self, balance: i64) -> Self {
        self.initial_balance = balance;
        self
    }

    pub fn with_send_timeout_secs(mut self, secs: u64) -> Self {
        self.send_timeout_secs = secs;
        self
    }

    /// Build the harness, creating and seeding the database.
    pub async fn build(self) -> Result<TestHarness, EduSmsError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| EduSmsError::Persistence {
            source: Box::new(e),
        })?;
        let db_path = temp_dir.path().join("test.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await?;
        seed(&storage, self.initial_balance).await?;
        let storage = Arc::new(storage);

        let vendor = MockVendor::new();
        let service = SmsService::new(
            Arc::clone(&storage) as Arc<dyn StorageAdapter>,
            Arc::new(vendor.clone()),
            &SendingConfig {
                send_timeout_secs: self.send_timeout_secs,
            },
        );

        Ok(TestHarness {
            service,
            storage,
            vendor,
            _temp_dir: temp_dir,
        })
    }
}

async fn seed(storage: &SqliteStorage, balance: i64) -> Result<(), EduSmsError> {
    let db = storage.database()?;
    directory::insert_company(
        db,
        &Company {
            id: COMPANY_ID,
            title: "Bright Minds".into(),
            sms_balance: balance,
        },
    )
    .await?;
    for (id, name, phone) in [
        (STUDENT_ID, "Aziz", "+998901234567"),
        (OTHER_STUDENT_ID, "Malika", "+998907654321"),
    ] {
        directory::insert_student(
            db,
            &Student {
                id: id.into(),
                company_id: COMPANY_ID,
                name: name.into(),
                phone_number: phone.into(),
            },
        )
        .await?;
    }
    directory::insert_room(
        db,
        &Room {
            id: ROOM_ID,
            company_id: COMPANY_ID,
            title: "Room 7".into(),
        },
    )
    .await?;
    directory::insert_group(
        db,
        &GroupInfo {
            id: GROUP_ID,
            company_id: COMPANY_ID,
            name: "IELTS".into(),
            start_time: "14:00".into(),
            days: vec!["Mon".into(), "Wed".into(), "Fri".into()],
            room_id: Some(ROOM_ID),
        },
    )
    .await
}

/// A complete service stack over a temp database.
pub struct TestHarness {
    pub service: SmsService,
    pub storage: Arc<SqliteStorage>,
    pub vendor: MockVendor,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Staff caller of the seeded company.
    pub fn caller(&self) -> CallerContext {
        CallerContext::new(COMPANY_ID, "admin-1", "Admin")
    }

    pub async fn balance(&self) -> Result<i64, EduSmsError> {
        self.service.ledger().balance(COMPANY_ID).await
    }

    /// Add another company, e.g. to check tenant isolation.
    pub async fn add_company(&self, id: i64, balance: i64) -> Result<(), EduSmsError> {
        directory::insert_company(
            self.storage.database()?,
            &Company {
                id,
                title: format!("Company {id}"),
                sms_balance: balance,
            },
        )
        .await
    }

    pub async fn add_student(
        &self,
        company_id: i64,
        id: &str,
        phone: &str,
    ) -> Result<(), EduSmsError> {
        directory::insert_student(
            self.storage.database()?,
            &Student {
                id: id.into(),
                company_id,
                name: id.into(),
                phone_number: phone.into(),
            },
        )
        .await
    }
}
