//! Demo mode: a throwaway bank with seeded accounts, kept in its own
//! database file so real data is never at risk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::demo::generate_demo_accounts;
use crate::adapters::duckdb::DuckDbRepository;
use crate::config::Config;
use crate::domain::result::Result;

pub struct DemoService {
    branchline_dir: PathBuf,
}

impl DemoService {
    pub fn new(branchline_dir: &Path) -> Self {
        Self {
            branchline_dir: branchline_dir.to_path_buf(),
        }
    }

    pub fn is_enabled(&self) -> Result<bool> {
        let config = Config::load(&self.branchline_dir)?;
        Ok(config.demo_mode)
    }

    /// Flip the config flag and rebuild demo.duckdb from scratch with the
    /// seeded accounts. Enabling twice gives the same known state.
    pub fn enable(&self) -> Result<()> {
        self.remove_demo_files()?;

        let mut config = Config::load(&self.branchline_dir).unwrap_or_default();
        config.enable_demo_mode();
        config.save(&self.branchline_dir)?;

        let repository = Arc::new(DuckDbRepository::new(&self.demo_db_path())?);
        repository.ensure_schema()?;

        for account in generate_demo_accounts() {
            repository.upsert_account(&account)?;
        }

        Ok(())
    }

    /// Flip the config flag back; with `clean` the demo database file is
    /// removed as well.
    pub fn disable(&self, clean: bool) -> Result<()> {
        let mut config = Config::load(&self.branchline_dir).unwrap_or_default();
        config.disable_demo_mode();
        config.save(&self.branchline_dir)?;

        if clean {
            self.remove_demo_files()?;
        }

        Ok(())
    }

    fn demo_db_path(&self) -> PathBuf {
        self.branchline_dir.join("demo.duckdb")
    }

    fn remove_demo_files(&self) -> Result<()> {
        // The WAL has to go too or DuckDB replays stale state
        let demo_db = self.demo_db_path();
        let demo_wal = self.branchline_dir.join("demo.duckdb.wal");
        if demo_db.exists() {
            std::fs::remove_file(&demo_db)?;
        }
        if demo_wal.exists() {
            std::fs::remove_file(&demo_wal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_enable_seeds_demo_accounts() {
        let dir = tempdir().unwrap();
        let service = DemoService::new(dir.path());

        service.enable().unwrap();
        assert!(service.is_enabled().unwrap());

        let repository = DuckDbRepository::new(&dir.path().join("demo.duckdb")).unwrap();
        assert_eq!(repository.get_account_count().unwrap(), 3);
    }

    #[test]
    fn test_enable_is_rerunnable() {
        let dir = tempdir().unwrap();
        let service = DemoService::new(dir.path());

        service.enable().unwrap();
        service.enable().unwrap();

        let repository = DuckDbRepository::new(&dir.path().join("demo.duckdb")).unwrap();
        assert_eq!(repository.get_account_count().unwrap(), 3);
    }

    #[test]
    fn test_disable_with_clean_removes_database() {
        let dir = tempdir().unwrap();
        let service = DemoService::new(dir.path());

        service.enable().unwrap();
        service.disable(true).unwrap();

        assert!(!service.is_enabled().unwrap());
        assert!(!dir.path().join("demo.duckdb").exists());
    }
}
