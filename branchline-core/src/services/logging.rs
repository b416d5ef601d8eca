//! Operational event log, kept in its own logs.duckdb file.
//!
//! No banking data (user ids, balances, amounts, PINs) is ever logged.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use duckdb::Connection;
use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::log_migrations::LOG_MIGRATIONS;

/// Sequence number folded into ids minted in the same millisecond
static SEQ: AtomicU64 = AtomicU64::new(0);

/// Mint a row id: unix millis in the high bits, sequence in the low 16
fn next_id() -> u64 {
    let seq = SEQ.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    (unix_millis() as u64) << 16 | seq
}

fn unix_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// One event on its way into the log.
///
/// Built with the `with_*` methods; anything not set stays NULL in the
/// store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
}

impl LogEvent {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            command: None,
            error_message: None,
            error_details: None,
        }
    }

    /// Name the CLI command this event belongs to
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attach an error message; entries with one show up in `get_errors`
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Attach extra error context
    pub fn with_error_details(mut self, details: impl Into<String>) -> Self {
        self.error_details = Some(details.into());
        self
    }
}

/// A log entry as stored in sys_logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: i64,
    pub app_version: String,
    pub platform: String,
    pub event: String,
    pub command: Option<String>,
    pub error_message: Option<String>,
    pub error_details: Option<String>,
}

const ENTRY_COLUMNS: &str =
    "id, timestamp, app_version, platform, event, command, error_message, error_details";

/// Owns the logs.duckdb connection. The app version and platform are
/// stamped onto every entry so old logs stay interpretable after
/// upgrades.
pub struct LoggingService {
    conn: Mutex<Connection>,
    db_path: PathBuf,
    app_version: String,
}

impl LoggingService {
    /// Open (or create) logs.duckdb in the branchline directory
    pub fn new(branchline_dir: &Path, app_version: impl Into<String>) -> Result<Self> {
        let db_path = branchline_dir.join("logs.duckdb");
        let conn = Connection::open(&db_path)?;

        let service = Self {
            conn: Mutex::new(conn),
            db_path,
            app_version: app_version.into(),
        };
        service.migrate()?;

        Ok(service)
    }

    /// Apply pending log-store migrations
    ///
    /// Same scheme as the banking store: the first migration creates the
    /// tracking table with IF NOT EXISTS and may run every time, the rest
    /// run once and are recorded.
    fn migrate(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        let (first_name, first_sql) = LOG_MIGRATIONS[0];
        conn.execute_batch(first_sql)?;

        let mut stmt = conn.prepare("SELECT migration_name FROM sys_migrations")?;
        let recorded: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();

        for (name, sql) in LOG_MIGRATIONS {
            if recorded.iter().any(|r| r == name) {
                continue;
            }
            if *name != first_name {
                conn.execute_batch(sql)?;
            }
            conn.execute(
                "INSERT INTO sys_migrations (migration_name) VALUES (?)",
                [name],
            )?;
        }

        Ok(())
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Record one event
    pub fn log(&self, event: LogEvent) -> Result<()> {
        let conn = self.lock_conn()?;

        conn.execute(
            "INSERT INTO sys_logs (id, timestamp, app_version, platform, event, command, \
             error_message, error_details) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            duckdb::params![
                next_id(),
                unix_millis(),
                &self.app_version,
                std::env::consts::OS,
                &event.event,
                &event.command,
                &event.error_message,
                &event.error_details,
            ],
        )?;

        Ok(())
    }

    /// The most recent entries, newest first
    pub fn get_recent(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query_entries("", limit)
    }

    /// The most recent entries carrying an error, newest first
    pub fn get_errors(&self, limit: usize) -> Result<Vec<LogEntry>> {
        self.query_entries("WHERE error_message IS NOT NULL", limit)
    }

    fn query_entries(&self, filter: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let conn = self.lock_conn()?;

        let sql = format!(
            "SELECT {} FROM sys_logs {} ORDER BY timestamp DESC LIMIT ?",
            ENTRY_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;

        let entries = stmt
            .query_map([limit as i64], |row| {
                Ok(LogEntry {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    app_version: row.get(2)?,
                    platform: row.get(3)?,
                    event: row.get(4)?,
                    command: row.get(5)?,
                    error_message: row.get(6)?,
                    error_details: row.get(7)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(entries)
    }

    /// Total number of stored entries
    pub fn count(&self) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM sys_logs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete entries with a timestamp before the cutoff (unix ms)
    pub fn delete_before(&self, timestamp_ms: i64) -> Result<u64> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute("DELETE FROM sys_logs WHERE timestamp < ?", [timestamp_ms])?;
        Ok(deleted as u64)
    }

    /// Path of the logs database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_database_file() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "1.0.0").unwrap();

        assert!(service.db_path().exists());
    }

    #[test]
    fn test_reopening_is_harmless() {
        let dir = tempdir().unwrap();
        {
            let service = LoggingService::new(dir.path(), "1.0.0").unwrap();
            service.log(LogEvent::new("first_run")).unwrap();
        }

        let service = LoggingService::new(dir.path(), "1.0.1").unwrap();
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_log_stamps_version_and_platform() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "1.2.3").unwrap();

        service
            .log(LogEvent::new("demo_enabled").with_command("demo"))
            .unwrap();

        let entries = service.get_recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].event, "demo_enabled");
        assert_eq!(entries[0].command, Some("demo".to_string()));
        assert_eq!(entries[0].app_version, "1.2.3");
        assert_eq!(entries[0].platform, std::env::consts::OS);
    }

    #[test]
    fn test_get_errors_filters_plain_events() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "1.0.0").unwrap();

        service.log(LogEvent::new("session_ended")).unwrap();
        service
            .log(
                LogEvent::new("login_failed")
                    .with_error("Database error: locked")
                    .with_error_details("during startup"),
            )
            .unwrap();

        let errors = service.get_errors(10).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].event, "login_failed");
        assert_eq!(
            errors[0].error_message,
            Some("Database error: locked".to_string())
        );
        assert_eq!(errors[0].error_details, Some("during startup".to_string()));
    }

    #[test]
    fn test_count_and_delete_before() {
        let dir = tempdir().unwrap();
        let service = LoggingService::new(dir.path(), "1.0.0").unwrap();

        for event in ["one", "two", "three"] {
            service.log(LogEvent::new(event)).unwrap();
        }
        assert_eq!(service.count().unwrap(), 3);

        let deleted = service.delete_before(unix_millis() + 1000).unwrap();
        assert_eq!(deleted, 3);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_ids_are_unique_within_a_millisecond() {
        let a = next_id();
        let b = next_id();
        assert_ne!(a, b);
    }
}
