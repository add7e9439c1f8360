// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template CRUD.

use edusms_core::types::TemplateType;
use edusms_core::EduSmsError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::SmsTemplate;
use crate::queries::parse_column;

const TEMPLATE_COLUMNS: &str = "id, company_id, texts, action_type, sms_template_type, is_active,
     insufficient_balance_send_count, sms_count, created_at";

/// Templates of one type for a company, oldest first.
pub async fn list_templates(
    db: &Database,
    company_id: i64,
    template_type: TemplateType,
) -> Result<Vec<SmsTemplate>, EduSmsError> {
    let template_type = template_type.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TEMPLATE_COLUMNS} FROM sms_template
                 WHERE company_id = ?1 AND sms_template_type = ?2
                 ORDER BY id ASC"
            ))?;
            let rows = stmt.query_map(params![company_id, template_type], row_to_template)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// A single template, only if it belongs to `company_id`.
pub async fn get_template(
    db: &Database,
    company_id: i64,
    id: i64,
) -> Result<Option<SmsTemplate>, EduSmsError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {TEMPLATE_COLUMNS} FROM sms_template WHERE id = ?1 AND company_id = ?2"),
                params![id, company_id],
                row_to_template,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert (`id == 0`) or update a template. `is_active` is left to its column default.
pub async fn save_template(db: &Database, template: &SmsTemplate) -> Result<i64, EduSmsError> {
    let template = template.clone();
    let (id, company_id) = (template.id, template.company_id);
    let saved = db
        .connection()
        .call(move |conn| {
            if template.id == 0 {
                conn.execute(
                    "INSERT INTO sms_template (company_id, texts, sms_count, action_type,
                                               sms_template_type, insufficient_balance_send_count,
                                               created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        template.company_id,
                        template.text,
                        template.segment_count,
                        template.action_type,
                        template.template_type.to_string(),
                        template.resend_count,
                        template.created_at,
                    ],
                )?;
                return Ok(Some(conn.last_insert_rowid()));
            }
            let updated = conn.execute(
                "UPDATE sms_template
                 SET texts = ?1, sms_count = ?2, action_type = ?3, sms_template_type = ?4,
                     insufficient_balance_send_count = ?5
                 WHERE id = ?6 AND company_id = ?7",
                params![
                    template.text,
                    template.segment_count,
                    template.action_type,
                    template.template_type.to_string(),
                    template.resend_count,
                    template.id,
                    template.company_id,
                ],
            )?;
            Ok((updated > 0).then_some(template.id))
        })
        .await
        .map_err(map_tr_err)?;

    saved.ok_or_else(|| EduSmsError::not_found("template", format!("{id} (company {company_id})")))
}

fn row_to_template(row: &rusqlite::Row<'_>) -> rusqlite::Result<SmsTemplate> {
    Ok(SmsTemplate {
        id: row.get(0)?,
        company_id: row.get(1)?,
        text: row.get(2)?,
        action_type: row.get(3)?,
        template_type: parse_column(row, 4)?,
        is_active: row.get(5)?,
        resend_count: row.get(6)?,
        segment_count: row.get(7)?,
        created_at: row.get(8)?,
    })
}
