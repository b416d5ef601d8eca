//! Opening, reopening, and failing to open the database file.
//! Timings print with -- --nocapture.

use std::time::Instant;

use rust_decimal::Decimal;
use tempfile::TempDir;

use branchline_core::adapters::duckdb::DuckDbRepository;
use branchline_core::domain::{Account, TransactionKind};

/// Open/drop in a loop; each open must succeed without tripping the
/// lock-retry path, since the previous connection has already released
/// the file.
#[test]
fn test_repeated_open_and_close() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_sequential.duckdb");

    for i in 0..5 {
        let start = Instant::now();
        let repo = DuckDbRepository::new(&db_path).unwrap();
        repo.ensure_schema().unwrap();
        println!("open {} took {:?}", i, start.elapsed());
    }
}

/// Data written through one connection is visible after reopening the file
#[test]
fn test_reopen_preserves_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_reopen.duckdb");

    {
        let repo = DuckDbRepository::new(&db_path).unwrap();
        repo.ensure_schema().unwrap();

        let account = Account::new(1, "1234", Decimal::new(10000, 2));
        repo.upsert_account(&account).unwrap();
        repo.apply_balance_change(1, Decimal::new(2500, 2), TransactionKind::Deposit)
            .unwrap();
    }

    // Reopen and verify everything survived the close
    let repo = DuckDbRepository::new(&db_path).unwrap();
    repo.ensure_schema().unwrap();

    let account = repo.get_account(1).unwrap().expect("Account should persist");
    assert_eq!(account.balance, Decimal::new(12500, 2));

    let records = repo.get_transactions_by_user(1).unwrap();
    assert_eq!(records.len(), 1, "Audit record should persist across reopen");
    assert_eq!(records[0].kind, TransactionKind::Deposit);
}

/// Schema initialization is idempotent across reopens
#[test]
fn test_ensure_schema_is_rerunnable() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_schema.duckdb");

    let repo = DuckDbRepository::new(&db_path).unwrap();
    repo.ensure_schema().unwrap();
    repo.ensure_schema().unwrap();

    // Still usable after the second run
    assert_eq!(repo.get_account_count().unwrap(), 0);
}

/// A missing parent directory is not a retryable condition: the open
/// fails immediately instead of sleeping through the backoff ladder
#[test]
fn test_open_in_missing_directory_fails_fast() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("does_not_exist").join("test.duckdb");

    let start = Instant::now();
    let result = DuckDbRepository::new(&db_path);
    let elapsed = start.elapsed();

    println!("Open failed after {:?}", elapsed);
    assert!(result.is_err(), "Open should fail when the directory is missing");
}
