// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template placeholder substitution.
//!
//! Templates carry literal tokens such as `(STUDENT)` or `(SUM)`. Rendering
//! replaces each token in a single left-to-right pass, so a substituted value
//! is never scanned again. A slot without a value renders its fallback text
//! and rendering itself cannot fail.

use serde::{Deserialize, Serialize};
use tracing::warn;

use edusms_core::{SegmentResult, StorageAdapter};

use crate::segment::compute_segments;

/// Values for the placeholder slots. `None` renders the slot's fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateBindings {
    pub student: Option<String>,
    pub group: Option<String>,
    pub time: Option<String>,
    pub center: Option<String>,
    pub teacher: Option<String>,
    pub days: Option<Vec<String>>,
    pub room: Option<String>,
    pub sum: Option<f64>,
}

/// Identifiers a caller supplies so bindings can be looked up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    pub student_id: Option<String>,
    pub group_id: Option<i64>,
    pub teacher_name: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Clone, Copy)]
enum Slot {
    Student,
    Group,
    Time,
    Center,
    Teacher,
    Days,
    Room,
    Sum,
}

/// (token, fallback, slot)
const TOKENS: [(&str, &str, Slot); 8] = [
    ("(STUDENT)", "(Student)", Slot::Student),
    ("(GROUP)", "(Group)", Slot::Group),
    ("(TIME)", "(Time)", Slot::Time),
    ("(LC)", "(LC)", Slot::Center),
    ("(TEACHER)", "(Teacher)", Slot::Teacher),
    ("(DAYS)", "(Days)", Slot::Days),
    ("(ROOM)", "(Room)", Slot::Room),
    ("(SUM)", "(Sum)", Slot::Sum),
];

impl TemplateBindings {
    fn value(&self, slot: Slot) -> Option<String> {
        match slot {
            Slot::Student => self.student.clone(),
            Slot::Group => self.group.clone(),
            Slot::Time => self.time.clone(),
            Slot::Center => self.center.clone(),
            Slot::Teacher => self.teacher.clone(),
            Slot::Days => self.days.as_ref().map(|d| d.join(", ")),
            Slot::Room => self.room.clone(),
            Slot::Sum => self.sum.map(|s| format!("{s:.2}")),
        }
    }
}

/// Substitute every token in `template` and segment the result.
pub fn render(template: &str, bindings: &TemplateBindings) -> (String, SegmentResult) {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('(') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match TOKENS.iter().find(|(token, _, _)| rest.starts_with(token)) {
            Some((token, fallback, slot)) => {
                match bindings.value(*slot) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(fallback),
                }
                rest = &rest[token.len()..];
            }
            None => {
                out.push('(');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);

    let segments = compute_segments(&out);
    (out, segments)
}

/// Look up bindings for `ctx` within `company_id`.
///
/// Misses and lookup errors are logged and leave the slot empty.
pub async fn resolve_bindings(
    directory: &dyn StorageAdapter,
    company_id: i64,
    ctx: &RenderContext,
) -> TemplateBindings {
    let mut bindings = TemplateBindings {
        teacher: ctx.teacher_name.clone(),
        sum: ctx.amount,
        ..Default::default()
    };

    match directory.company_name(company_id).await {
        Ok(Some(title)) => bindings.center = Some(title),
        Ok(None) => warn!(company_id, "company not found, using fallback"),
        Err(e) => warn!(company_id, error = %e, "company lookup failed, using fallback"),
    }

    if let Some(student_id) = ctx.student_id.as_deref() {
        match directory.student_name(company_id, student_id).await {
            Ok(Some(name)) => bindings.student = Some(name),
            Ok(None) => warn!(student_id, "student not found, using fallback"),
            Err(e) => warn!(student_id, error = %e, "student lookup failed, using fallback"),
        }
    }

    if let Some(group_id) = ctx.group_id {
        match directory.group_info(company_id, group_id).await {
            Ok(Some(group)) => {
                if let Some(room_id) = group.room_id {
                    match directory.room_name(company_id, room_id).await {
                        Ok(Some(title)) => bindings.room = Some(title),
                        Ok(None) => warn!(room_id, "room not found, using fallback"),
                        Err(e) => warn!(room_id, error = %e, "room lookup failed, using fallback"),
                    }
                }
                bindings.group = Some(group.name);
                bindings.time = Some(group.start_time);
                bindings.days = Some(group.days);
            }
            Ok(None) => warn!(group_id, "group not found, using fallback"),
            Err(e) => warn!(group_id, error = %e, "group lookup failed, using fallback"),
        }
    }

    bindings
}
