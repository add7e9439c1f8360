// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment ledger: credits and reversals paired with balance updates.

use edusms_core::types::PageRequest;
use edusms_core::EduSmsError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::SmsPaymentTransaction;

enum Outcome<T> {
    Done(T),
    Missing,
}

/// Add `segments_granted` to the company balance and insert the payment row.
///
/// Both writes share one transaction. An unknown company writes nothing.
pub async fn credit_payment(
    db: &Database,
    payment: &SmsPaymentTransaction,
) -> Result<(), EduSmsError> {
    let payment = payment.clone();
    let company_id = payment.company_id;
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE company SET sms_balance = sms_balance + ?1 WHERE id = ?2",
                params![payment.segments_granted, payment.company_id],
            )?;
            if updated == 0 {
                return Ok(Outcome::Missing);
            }
            tx.execute(
                "INSERT INTO sms_payments (id, company_id, comment, amount, sms_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    payment.id,
                    payment.company_id,
                    payment.comment,
                    payment.sum_paid,
                    payment.segments_granted,
                    payment.created_at,
                ],
            )?;
            tx.commit()?;
            Ok(Outcome::Done(()))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        Outcome::Done(()) => Ok(()),
        Outcome::Missing => Err(EduSmsError::not_found("company", company_id)),
    }
}

/// Delete a payment and subtract its segments from the owning company.
///
/// No floor is applied: the balance may go negative.
pub async fn reverse_payment(
    db: &Database,
    id: &str,
) -> Result<SmsPaymentTransaction, EduSmsError> {
    let id = id.to_string();
    let lookup_id = id.clone();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let payment = tx
                .query_row(
                    "SELECT id, company_id, comment, amount, sms_count, created_at
                     FROM sms_payments WHERE id = ?1",
                    params![lookup_id],
                    row_to_payment,
                )
                .optional()?;
            let Some(payment) = payment else {
                return Ok(Outcome::Missing);
            };
            tx.execute("DELETE FROM sms_payments WHERE id = ?1", params![payment.id])?;
            tx.execute(
                "UPDATE company SET sms_balance = sms_balance - ?1 WHERE id = ?2",
                params![payment.segments_granted, payment.company_id],
            )?;
            tx.commit()?;
            Ok(Outcome::Done(payment))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        Outcome::Done(payment) => Ok(payment),
        Outcome::Missing => Err(EduSmsError::not_found("payment", id)),
    }
}

/// One page of a company's payments, newest first.
pub async fn list_payments(
    db: &Database,
    company_id: i64,
    page: PageRequest,
) -> Result<Vec<SmsPaymentTransaction>, EduSmsError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, company_id, comment, amount, sms_count, created_at
                 FROM sms_payments WHERE company_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?2 OFFSET ?3",
            )?;
            let rows = stmt.query_map(
                params![company_id, page.size, page.offset()],
                row_to_payment,
            )?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

fn row_to_payment(row: &rusqlite::Row<'_>) -> rusqlite::Result<SmsPaymentTransaction> {
    Ok(SmsPaymentTransaction {
        id: row.get(0)?,
        company_id: row.get(1)?,
        comment: row.get(2)?,
        sum_paid: row.get(3)?,
        segments_granted: row.get(4)?,
        created_at: row.get(5)?,
    })
}
