// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Billing primitives for the EduSMS core.
//!
//! This crate provides:
//! - **Segmenter**: alphabet detection and billed segment counts
//! - **Template renderer**: placeholder substitution with graceful fallbacks
//! - **Balance ledger**: top-ups and reversals paired with balance updates

pub mod ledger;
pub mod render;
pub mod segment;

pub use ledger::BalanceLedger;
pub use render::{render, resolve_bindings, RenderContext, TemplateBindings};
pub use ledger::now_timestamp;
pub use segment::{classify, compute_segments};
