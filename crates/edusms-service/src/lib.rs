// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send workflow and caller-facing operations for the EduSMS core.

pub mod service;
pub mod workflow;

pub use service::{
    AddSmsRequest, RenderedMessage, SendSmsDirectlyRequest, SetTemplateRequest, SmsService,
};
pub use workflow::{PendingUsage, SendReceipt, SendSmsRequest, SendSmsWorkflow, SendState};
