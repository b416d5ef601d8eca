//! DuckDB-backed account store and audit trails

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, SessionAction, SessionEvent, TransactionKind, TransactionRecord};
use crate::services::MigrationService;

/// How many times to reattempt opening a locked database file
const MAX_RETRIES: u32 = 5;

/// First backoff delay; doubles per attempt (50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// True when the message describes a file lock that may clear on its own.
/// Covers the wordings seen on Windows and on Unix-likes.
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// The account store: one DuckDB file behind a mutex
///
/// All balance mutations go through conditional updates checked by
/// affected-row count, so the store itself enforces the non-negative
/// balance rule. Callers never decide sufficiency from a cached value.
pub struct DuckDbRepository {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbRepository {
    /// Open the database file, waiting out transient file locks
    ///
    /// A previous process may still be releasing the file; lock errors are
    /// retried with exponential backoff before giving up. Any other open
    /// error fails immediately.
    pub fn new(db_path: &Path) -> Result<Self> {
        for attempt in 0..MAX_RETRIES {
            match Self::open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if !is_retryable_error(&err_msg) || attempt == MAX_RETRIES - 1 {
                        return Err(e);
                    }
                    let delay = Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                    eprintln!(
                        "[branchline] Database busy, retrying in {}ms (attempt {}/{}): {}",
                        delay.as_millis(),
                        attempt + 1,
                        MAX_RETRIES,
                        err_msg
                    );
                    thread::sleep(delay);
                }
            }
        }

        Err(Error::database(format!(
            "Failed to open database after {} retries",
            MAX_RETRIES
        )))
    }

    fn open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading is off: nothing here needs extensions, and
        // stale cached ones can fail code signing on macOS.
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let conn = Connection::open_with_flags(db_path, config)?;
        Ok(conn)
    }

    /// Apply pending schema migrations
    pub fn run_migrations(&self) -> Result<crate::services::MigrationResult> {
        let conn = self.conn.lock().unwrap();
        MigrationService::new(&conn).run_pending()
    }

    /// Bring the schema up to date, discarding the migration report
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Path of the database file
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // === Accounts ===

    /// Look up an account by id and PIN
    ///
    /// Returns None when no account matches; a failed login is a normal
    /// outcome, not an error.
    pub fn authenticate(&self, user_id: i64, pin: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            "SELECT id, pin, balance::VARCHAR, created_at::VARCHAR, updated_at::VARCHAR
             FROM users WHERE id = ? AND pin = ?",
            params![user_id, pin],
            |row| Ok(self.row_to_account(row)),
        ) {
            Ok(account) => Ok(account),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_account(&self, user_id: i64) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            "SELECT id, pin, balance::VARCHAR, created_at::VARCHAR, updated_at::VARCHAR
             FROM users WHERE id = ?",
            params![user_id],
            |row| Ok(self.row_to_account(row)),
        ) {
            Ok(account) => Ok(account),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, pin, balance::VARCHAR, created_at::VARCHAR, updated_at::VARCHAR
             FROM users ORDER BY id",
        )?;

        let accounts = stmt
            .query_map([], |row| Ok(self.row_to_account(row)))?
            .filter_map(|r| r.ok())
            .flatten()
            .collect();

        Ok(accounts)
    }

    pub fn upsert_account(&self, account: &Account) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO users (id, pin, balance, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (id) DO UPDATE SET
                pin = EXCLUDED.pin,
                balance = EXCLUDED.balance,
                updated_at = EXCLUDED.updated_at",
            params![
                account.id,
                account.pin,
                decimal_to_f64(account.balance),
                account.created_at.to_rfc3339(),
                account.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_account_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    // === Balance mutations ===

    /// Apply a signed balance change and append the matching audit record
    ///
    /// The sufficiency check happens in the store: the update only matches
    /// when the resulting balance stays non-negative, and a zero affected-row
    /// count means the change was refused. Both writes happen in one
    /// transaction.
    ///
    /// Returns the new balance, or None when the account has insufficient
    /// funds for a negative change. A missing account is a NotFound error.
    pub fn apply_balance_change(
        &self,
        user_id: i64,
        delta: Decimal,
        kind: TransactionKind,
    ) -> Result<Option<Decimal>> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("BEGIN TRANSACTION")?;
        match Self::apply_balance_change_in_tx(&conn, user_id, delta, kind) {
            Ok(result) => {
                conn.execute_batch("COMMIT")?;
                Ok(result)
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    fn apply_balance_change_in_tx(
        conn: &Connection,
        user_id: i64,
        delta: Decimal,
        kind: TransactionKind,
    ) -> Result<Option<Decimal>> {
        let delta_f64 = decimal_to_f64(delta);

        let updated = conn.execute(
            "UPDATE users
             SET balance = balance + ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ? AND balance + ? >= 0",
            params![delta_f64, user_id, delta_f64],
        )?;

        if updated == 0 {
            return if account_exists(conn, user_id)? {
                Ok(None)
            } else {
                Err(Error::not_found(format!("No account with id {}", user_id)))
            };
        }

        insert_transaction_row(conn, user_id, kind, delta.abs())?;

        Ok(Some(current_balance(conn, user_id)?))
    }

    /// Move an amount between two accounts as one atomic unit
    ///
    /// Debit, credit and the sender's audit record either all commit or all
    /// roll back. A credit leg that matches no row raises
    /// Error::TransferInconsistent and undoes the debit.
    ///
    /// Returns the sender's new balance, or None when the sender has
    /// insufficient funds.
    pub fn transfer_funds(
        &self,
        from_user: i64,
        to_user: i64,
        amount: Decimal,
    ) -> Result<Option<Decimal>> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch("BEGIN TRANSACTION")?;
        match Self::transfer_funds_in_tx(&conn, from_user, to_user, amount) {
            Ok(result) => {
                conn.execute_batch("COMMIT")?;
                Ok(result)
            }
            Err(e) => {
                let _ = conn.execute_batch("ROLLBACK");
                Err(e)
            }
        }
    }

    fn transfer_funds_in_tx(
        conn: &Connection,
        from_user: i64,
        to_user: i64,
        amount: Decimal,
    ) -> Result<Option<Decimal>> {
        let amount_f64 = decimal_to_f64(amount);

        // Debit leg, refused by the store when funds are insufficient
        let debited = conn.execute(
            "UPDATE users
             SET balance = balance - ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ? AND balance - ? >= 0",
            params![amount_f64, from_user, amount_f64],
        )?;

        if debited == 0 {
            return if account_exists(conn, from_user)? {
                Ok(None)
            } else {
                Err(Error::not_found(format!("No account with id {}", from_user)))
            };
        }

        // Credit leg. Zero affected rows means the recipient vanished after
        // validation; the whole transfer rolls back.
        let credited = conn.execute(
            "UPDATE users
             SET balance = balance + ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?",
            params![amount_f64, to_user],
        )?;

        if credited == 0 {
            return Err(Error::TransferInconsistent(format!(
                "credit to account {} matched no row",
                to_user
            )));
        }

        // Audit record for the sender only
        insert_transaction_row(conn, from_user, TransactionKind::Transfer, amount)?;

        // The update reports affected rows only; read the balance back
        // inside the same transaction for the committed value.
        Ok(Some(current_balance(conn, from_user)?))
    }

    // === Audit trails ===

    pub fn record_session_event(&self, user_id: i64, action: SessionAction) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO user_sessions (user_id, session_action, session_time)
             VALUES (?, ?, CURRENT_TIMESTAMP)",
            params![user_id, action.as_str()],
        )?;
        Ok(())
    }

    /// Get all transaction records for one user, newest first
    ///
    /// Ties on the timestamp are broken by insertion order, so the most
    /// recently written row still comes first.
    pub fn get_transactions_by_user(&self, user_id: i64) -> Result<Vec<TransactionRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT user_id, transaction_type, amount::VARCHAR, transaction_date::VARCHAR
             FROM transactions
             WHERE user_id = ?
             ORDER BY transaction_date DESC, rowid DESC",
        )?;

        let records = stmt
            .query_map(params![user_id], |row| Ok(self.row_to_transaction(row)))?
            .filter_map(|r| r.ok())
            .flatten()
            .collect();

        Ok(records)
    }

    /// Get all session events for one user, newest first
    pub fn get_session_events(&self, user_id: i64) -> Result<Vec<SessionEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT user_id, session_action, session_time::VARCHAR
             FROM user_sessions
             WHERE user_id = ?
             ORDER BY session_time DESC, rowid DESC",
        )?;

        let events = stmt
            .query_map(params![user_id], |row| Ok(self.row_to_session_event(row)))?
            .filter_map(|r| r.ok())
            .flatten()
            .collect();

        Ok(events)
    }

    pub fn get_transaction_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_session_event_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM user_sessions", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn get_transaction_date_range(&self) -> Result<crate::services::DateRange> {
        let conn = self.conn.lock().unwrap();
        let result: (Option<String>, Option<String>) = conn.query_row(
            "SELECT
                MIN(transaction_date)::VARCHAR,
                MAX(transaction_date)::VARCHAR
             FROM transactions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(crate::services::DateRange {
            earliest: result.0,
            latest: result.1,
        })
    }

    // === Row mappers ===
    //
    // Rows that fail to decode are skipped rather than failing the whole
    // query, matching the tolerant read behavior elsewhere in the crate.

    fn row_to_account(&self, row: &duckdb::Row) -> Option<Account> {
        // Columns: 0: id, 1: pin, 2: balance, 3: created_at, 4: updated_at
        let balance_str: String = row.get(2).ok()?;
        let created_at_str: String = row.get(3).ok()?;
        let updated_at_str: String = row.get(4).ok()?;

        Some(Account {
            id: row.get(0).ok()?,
            pin: row.get(1).ok()?,
            balance: Decimal::from_str_exact(&balance_str).unwrap_or_default(),
            created_at: parse_timestamp(&created_at_str),
            updated_at: parse_timestamp(&updated_at_str),
        })
    }

    fn row_to_transaction(&self, row: &duckdb::Row) -> Option<TransactionRecord> {
        // Columns: 0: user_id, 1: transaction_type, 2: amount, 3: transaction_date
        let kind_str: String = row.get(1).ok()?;
        let amount_str: String = row.get(2).ok()?;
        let date_str: String = row.get(3).ok()?;

        Some(TransactionRecord {
            user_id: row.get(0).ok()?,
            kind: TransactionKind::parse(&kind_str)?,
            amount: Decimal::from_str_exact(&amount_str).unwrap_or_default(),
            transaction_date: parse_naive_datetime(&date_str),
        })
    }

    fn row_to_session_event(&self, row: &duckdb::Row) -> Option<SessionEvent> {
        // Columns: 0: user_id, 1: session_action, 2: session_time
        let action_str: String = row.get(1).ok()?;
        let time_str: String = row.get(2).ok()?;

        Some(SessionEvent {
            user_id: row.get(0).ok()?,
            action: SessionAction::parse(&action_str)?,
            session_time: parse_naive_datetime(&time_str),
        })
    }
}

fn account_exists(conn: &Connection, user_id: i64) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE id = ?",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn current_balance(conn: &Connection, user_id: i64) -> Result<Decimal> {
    let balance_str: String = conn.query_row(
        "SELECT balance::VARCHAR FROM users WHERE id = ?",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(Decimal::from_str_exact(&balance_str).unwrap_or_default())
}

fn insert_transaction_row(
    conn: &Connection,
    user_id: i64,
    kind: TransactionKind,
    amount: Decimal,
) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions (user_id, transaction_type, amount, transaction_date)
         VALUES (?, ?, ?, CURRENT_TIMESTAMP)",
        params![user_id, kind.as_str(), decimal_to_f64(amount)],
    )?;
    Ok(())
}

// Decimal/timestamp conversion helpers

fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_string().parse::<f64>().unwrap_or(0.0)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    parse_naive_datetime(s).and_utc()
}

// DuckDB renders timestamps as VARCHAR in several shapes depending on
// the column and whether a zone is attached; accept all of them.
fn parse_naive_datetime(s: &str) -> NaiveDateTime {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.naive_utc();
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .unwrap_or_else(|_| Utc::now().naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Helper Function Tests ====================

    #[test]
    fn test_parse_naive_datetime_duckdb_format() {
        let dt = parse_naive_datetime("2026-01-14 23:59:59.123456");
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-01-14 23:59:59");
    }

    #[test]
    fn test_parse_naive_datetime_without_fraction() {
        let dt = parse_naive_datetime("2026-01-14 23:59:59");
        assert_eq!(dt.format("%Y-%m-%d").to_string(), "2026-01-14");
    }

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let dt = parse_timestamp("2026-01-14T23:59:59+00:00");
        assert_eq!(dt.format("%Y-%m-%d %H:%M:%S").to_string(), "2026-01-14 23:59:59");
    }

    #[test]
    fn test_parse_timestamp_naive_fallback() {
        let dt = parse_timestamp("2026-01-14 10:30:00");
        assert_eq!(dt.format("%H:%M:%S").to_string(), "10:30:00");
    }

    #[test]
    fn test_decimal_to_f64() {
        assert_eq!(decimal_to_f64(Decimal::new(12345, 2)), 123.45);
        assert_eq!(decimal_to_f64(Decimal::ZERO), 0.0);
        assert_eq!(decimal_to_f64(Decimal::new(-5000, 2)), -50.0);
    }

    #[test]
    fn test_is_retryable_error() {
        assert!(is_retryable_error("IO Error: database is locked"));
        assert!(is_retryable_error("File is already open in another process"));
        assert!(!is_retryable_error("Catalog Error: table users not found"));
    }
}
