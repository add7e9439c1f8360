// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for EduSMS integration tests.
//!
//! Provides a mock SMS vendor and a test harness for fast, deterministic,
//! CI-runnable tests without the Eskiz gateway.
//!
//! # Components
//!
//! - [`MockVendor`] - Records sent messages, fails on demand
//! - [`TestHarness`] - Temp SQLite store with a seeded company, wired to [`SmsService`]
//!
//! [`SmsService`]: edusms_service::SmsService

pub mod harness;
pub mod mock_vendor;

pub use harness::TestHarness;
pub use mock_vendor::MockVendor;
