// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage records: one row per delivered message, debited atomically.

use edusms_core::types::PageRequest;
use edusms_core::EduSmsError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};
use crate::models::SmsUsageRecord;
use crate::queries::parse_column;

/// Debit the company balance and append the usage row in one transaction.
pub async fn record_usage(db: &Database, usage: &SmsUsageRecord) -> Result<(), EduSmsError> {
    let usage = usage.clone();
    let company_id = usage.company_id;
    let debited = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE company SET sms_balance = sms_balance - ?1 WHERE id = ?2",
                params![usage.segment_count, usage.company_id],
            )?;
            if updated == 0 {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO sms_used (id, company_id, student_id, texts, sms_count,
                                       created_by_id, created_by_name, sms_used_type, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    usage.id,
                    usage.company_id,
                    usage.student_id,
                    usage.text,
                    usage.segment_count,
                    usage.creator_id,
                    usage.creator_name,
                    usage.used_type.to_string(),
                    usage.sent_at,
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)?;

    if debited {
        Ok(())
    } else {
        Err(EduSmsError::not_found("company", company_id))
    }
}

/// One page of usage rows, newest first, optionally for a single student.
pub async fn list_usage(
    db: &Database,
    company_id: i64,
    student_id: Option<&str>,
    page: PageRequest,
) -> Result<Vec<SmsUsageRecord>, EduSmsError> {
    let student_id = student_id.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, company_id, student_id, texts, sms_count,
                        created_by_id, created_by_name, sms_used_type, created_at
                 FROM sms_used
                 WHERE company_id = ?1 AND (?2 IS NULL OR student_id = ?2)
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?3 OFFSET ?4",
            )?;
            let rows = stmt.query_map(
                params![company_id, student_id, page.size, page.offset()],
                |row| {
                    Ok(SmsUsageRecord {
                        id: row.get(0)?,
                        company_id: row.get(1)?,
                        student_id: row.get(2)?,
                        text: row.get(3)?,
                        segment_count: row.get(4)?,
                        creator_id: row.get(5)?,
                        creator_name: row.get(6)?,
                        used_type: parse_column(row, 7)?,
                        sent_at: row.get(8)?,
                    })
                },
            )?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
