// SPDX-FileCopyrightText: 2026 EduSMS Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All statements run on tokio-rusqlite's single background thread, so
//! transactions never interleave. Do NOT open additional connections for writes.

use edusms_core::EduSmsError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Path that selects a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Convert a tokio-rusqlite error into [`EduSmsError::Persistence`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> EduSmsError {
    EduSmsError::Persistence {
        source: Box::new(e),
    }
}

/// The single writer handle to the SQLite database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, EduSmsError> {
        Self::open_with(path, true).await
    }

    /// Open a fresh in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, EduSmsError> {
        Self::open_with(IN_MEMORY_PATH, false).await
    }

    /// Open the database at `path`, choosing the journal mode explicitly.
    ///
    /// WAL is never enabled for in-memory databases.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, EduSmsError> {
        let in_memory = path == IN_MEMORY_PATH;
        let conn = if in_memory {
            Connection::open_in_memory().await
        } else {
            Connection::open(path).await
        }
        .map_err(|e| EduSmsError::Persistence {
            source: format!("failed to open database at {path}: {e}").into(),
        })?;

        let use_wal = wal_mode && !in_memory;
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")?;
            if use_wal {
                let mode: String =
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
                debug!(journal_mode = %mode, "journal mode set");
            }
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| EduSmsError::Persistence {
                source: format!("migration failed: {e}").into(),
            })?;

        debug!(path, wal = use_wal, "database opened");
        Ok(Self { conn })
    }

    /// The underlying connection; every query module goes through `call()` on it.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, waiting for queued statements to finish.
    pub async fn close(self) -> Result<(), EduSmsError> {
        self.conn
            .close()
            .await
            .map_err(|e| EduSmsError::Persistence {
                source: format!("failed to close database: {e}").into(),
            })
    }
}
