// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `edusms doctor` command implementation.
//!
//! Runs diagnostic checks against the configured store and SMS vendor.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use edusms_config::EduSmsConfig;
use edusms_core::{EduSmsError, HealthStatus, PluginAdapter, StorageAdapter};
use edusms_storage::database::map_tr_err;
use edusms_storage::SqliteStorage;

use crate::commands::build_vendor;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `edusms doctor` command.
///
/// With `--deep`, also runs `PRAGMA integrity_check`. With `--plain`,
/// disables colored output.
pub async fn run_doctor(config: &EduSmsConfig, deep: bool, plain: bool) -> Result<(), EduSmsError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let mut results = vec![
        check_storage(config).await,
        check_vendor(config).await,
    ];
    if deep {
        results.push(check_db_integrity(config).await);
    }

    println!();
    println!("  {} doctor", config.service.name);
    println!("  {}", "-".repeat(50));

    let mut issues = 0;
    for result in &results {
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        println!("{}", format_line(result, use_color));
    }

    println!();
    if issues > 0 {
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep for detailed diagnostics.");
        }
    } else {
        println!("  All checks passed.");
    }
    println!();

    Ok(())
}

fn format_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if use_color {
        use colored::Colorize;
        let (symbol, message) = match result.status {
            CheckStatus::Pass => ("✓".green(), result.message.normal()),
            CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
            CheckStatus::Fail => ("✗".red(), result.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({duration_ms}ms)", result.name)
    } else {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        )
    }
}

fn health_to_check(name: &str, health: Result<HealthStatus, EduSmsError>, start: Instant) -> CheckResult {
    match health {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, "healthy", start),
        Ok(HealthStatus::Degraded(why)) => CheckResult::new(name, CheckStatus::Warn, why, start),
        Ok(HealthStatus::Unhealthy(why)) => CheckResult::new(name, CheckStatus::Fail, why, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

/// Open the store (migrations included) and run its health check.
async fn check_storage(config: &EduSmsConfig) -> CheckResult {
    let start = Instant::now();
    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
    }
    let result = health_to_check("Database", storage.health_check().await, start);
    let _ = storage.close().await;
    result
}

/// Log in to the vendor. Missing credentials are a warning, not a failure.
async fn check_vendor(config: &EduSmsConfig) -> CheckResult {
    let start = Instant::now();
    if config.eskiz.email.is_none() || config.eskiz.password.is_none() {
        return CheckResult::new(
            "SMS vendor",
            CheckStatus::Warn,
            "no Eskiz credentials configured",
            start,
        );
    }
    let vendor = build_vendor(config);
    health_to_check("SMS vendor", vendor.health_check().await, start)
}

/// Deep check: `PRAGMA integrity_check` on the database file.
async fn check_db_integrity(config: &EduSmsConfig) -> CheckResult {
    let start = Instant::now();
    let path = &config.storage.database_path;
    if path != ":memory:" && !Path::new(path).exists() {
        return CheckResult::new(
            "DB integrity",
            CheckStatus::Warn,
            "database not found (skipped)",
            start,
        );
    }

    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return CheckResult::new("DB integrity", CheckStatus::Fail, format!("open failed: {e}"), start);
    }
    let rows = match storage.database() {
        Ok(db) => db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare("PRAGMA integrity_check")?;
                let rows = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err),
        Err(e) => Err(e),
    };
    let _ = storage.close().await;

    match rows {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            CheckResult::new("DB integrity", CheckStatus::Pass, "ok", start)
        }
        Ok(rows) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("{} issue(s) found", rows.len()),
            start,
        ),
        Err(e) => CheckResult::new("DB integrity", CheckStatus::Fail, format!("check failed: {e}"), start),
    }
}
