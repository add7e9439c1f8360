// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only lookups against the directory tables, plus seeding helpers.
//!
//! Companies, students, groups and rooms are owned by the wider platform.
//! The `insert_*` functions exist for test fixtures. Every lookup except the
//! company ones is scoped to a company, so foreign rows read as missing.

use edusms_core::EduSmsError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::{Company, GroupInfo, Room, Student};

/// Current SMS balance of a company.
pub async fn company_balance(db: &Database, company_id: i64) -> Result<Option<i64>, EduSmsError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT sms_balance FROM company WHERE id = ?1",
                params![company_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn company_name(db: &Database, company_id: i64) -> Result<Option<String>, EduSmsError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT title FROM company WHERE id = ?1",
                params![company_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Phone number of a student, only if the student belongs to `company_id`.
///
/// Blank numbers count as missing.
pub async fn student_phone(
    db: &Database,
    company_id: i64,
    student_id: &str,
) -> Result<Option<String>, EduSmsError> {
    let student_id = student_id.to_string();
    let phone: Option<String> = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT phone_number FROM students WHERE id = ?1 AND company_id = ?2",
                params![student_id, company_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;
    Ok(phone.filter(|p| !p.trim().is_empty()))
}

pub async fn student_name(
    db: &Database,
    company_id: i64,
    student_id: &str,
) -> Result<Option<String>, EduSmsError> {
    let student_id = student_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT name FROM students WHERE id = ?1 AND company_id = ?2",
                params![student_id, company_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Group name, start time, weekdays and room of a study group.
pub async fn group_info(
    db: &Database,
    company_id: i64,
    group_id: i64,
) -> Result<Option<GroupInfo>, EduSmsError> {
    let row: Option<(GroupInfo, String)> = db
        .connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, company_id, name, start_time, days, room_id
                 FROM study_groups WHERE id = ?1 AND company_id = ?2",
                params![group_id, company_id],
                |row| {
                    Ok((
                        GroupInfo {
                            id: row.get(0)?,
                            company_id: row.get(1)?,
                            name: row.get(2)?,
                            start_time: row.get(3)?,
                            days: Vec::new(),
                            room_id: row.get(5)?,
                        },
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)?;

    row.map(|(mut group, days)| {
        group.days = serde_json::from_str(&days).map_err(|e| EduSmsError::Persistence {
            source: format!("group {group_id} has malformed days: {e}").into(),
        })?;
        Ok(group)
    })
    .transpose()
}

pub async fn room_name(
    db: &Database,
    company_id: i64,
    room_id: i64,
) -> Result<Option<String>, EduSmsError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT title FROM rooms WHERE id = ?1 AND company_id = ?2",
                params![room_id, company_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

// --- Seeding ---

pub async fn insert_company(db: &Database, company: &Company) -> Result<(), EduSmsError> {
    let company = company.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO company (id, title, sms_balance) VALUES (?1, ?2, ?3)",
                params![company.id, company.title, company.sms_balance],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_student(db: &Database, student: &Student) -> Result<(), EduSmsError> {
    let student = student.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO students (id, company_id, name, phone_number) VALUES (?1, ?2, ?3, ?4)",
                params![
                    student.id,
                    student.company_id,
                    student.name,
                    student.phone_number
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_room(db: &Database, room: &Room) -> Result<(), EduSmsError> {
    let room = room.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO rooms (id, company_id, title) VALUES (?1, ?2, ?3)",
                params![room.id, room.company_id, room.title],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_group(db: &Database, group: &GroupInfo) -> Result<(), EduSmsError> {
    let days = serde_json::to_string(&group.days).map_err(|e| EduSmsError::Internal(e.to_string()))?;
    let group = group.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO study_groups (id, company_id, name, start_time, days, room_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    group.id,
                    group.company_id,
                    group.name,
                    group.start_time,
                    days,
                    group.room_id
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
