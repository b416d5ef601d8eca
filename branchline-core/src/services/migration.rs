//! Migration service - schema management for the banking database
//!
//! Each migration is an embedded SQL file applied at most once; the
//! sys_migrations table records what has already run.

use duckdb::Connection;

use crate::domain::result::Result;
use crate::migrations::MIGRATIONS;

/// What a run_pending call did
#[derive(Debug)]
pub struct MigrationResult {
    /// Names applied by this run, in order
    pub applied: Vec<String>,
    /// How many migrations were already in place
    pub skipped: usize,
}

/// Applies embedded migrations against one connection
pub struct MigrationService<'a> {
    conn: &'a Connection,
}

impl<'a> MigrationService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Bring the schema up to date
    ///
    /// The first migration creates the tracking table itself with
    /// IF NOT EXISTS, so it is safe to execute on every startup; after
    /// that, anything not yet recorded in sys_migrations runs in order.
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let (first_name, first_sql) = MIGRATIONS[0];
        self.conn.execute_batch(first_sql)?;

        let recorded = self.get_applied()?;
        let mut applied = Vec::new();

        for (name, sql) in MIGRATIONS {
            if recorded.iter().any(|r| r == name) {
                continue;
            }
            if *name != first_name {
                self.conn.execute_batch(sql)?;
            }
            self.mark_applied(name)?;
            applied.push((*name).to_string());
        }

        Ok(MigrationResult {
            applied,
            skipped: recorded.len(),
        })
    }

    /// Names recorded in sys_migrations, sorted
    pub fn get_applied(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn mark_applied(&self, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sys_migrations (migration_name) VALUES (?)",
            [name],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckdb::Connection;

    #[test]
    fn test_fresh_database_applies_everything() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn);

        let result = service.run_pending().unwrap();
        assert_eq!(result.applied.len(), MIGRATIONS.len());
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn test_second_run_applies_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn);

        service.run_pending().unwrap();
        let result = service.run_pending().unwrap();

        assert!(result.applied.is_empty());
        assert_eq!(result.skipped, MIGRATIONS.len());
    }

    #[test]
    fn test_applied_names_are_recorded() {
        let conn = Connection::open_in_memory().unwrap();
        let service = MigrationService::new(&conn);

        service.run_pending().unwrap();

        let applied = service.get_applied().unwrap();
        let expected: Vec<String> = MIGRATIONS.iter().map(|(n, _)| (*n).to_string()).collect();
        assert_eq!(applied, expected);
    }

    #[test]
    fn test_initial_schema_creates_banking_tables() {
        let conn = Connection::open_in_memory().unwrap();
        MigrationService::new(&conn).run_pending().unwrap();

        for table in ["users", "user_sessions", "transactions"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }
}
