//! Branchline Core - Business logic for terminal banking
//!
//! This crate implements the core domain logic:
//!
//! - **domain**: Core business entities (Account, Session, TransactionRecord)
//! - **services**: Business logic orchestration (auth, teller, history)
//! - **adapters**: Concrete implementations (DuckDB, demo data)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use domain::result::Result;
use services::*;

// The types callers touch constantly, lifted to the crate root
pub use domain::result::Error;
pub use domain::{
    Account, Session, SessionAction, SessionEvent, TransactionKind, TransactionRecord,
};
pub use services::{LogEntry, LogEvent, LoggingService, TellerOutcome};

/// One open bank: the repository plus every service wired onto it.
/// The CLI builds one of these per invocation.
pub struct BranchlineContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub auth_service: AuthService,
    pub teller_service: TellerService,
    pub history_service: HistoryService,
    pub status_service: StatusService,
}

impl BranchlineContext {
    pub fn new(branchline_dir: &Path) -> Result<Self> {
        let config = Config::load(branchline_dir)?;

        // Demo mode runs against its own database file
        let db_filename = if config.demo_mode {
            "demo.duckdb"
        } else {
            "branchline.duckdb"
        };

        let db_path = branchline_dir.join(db_filename);
        let repository = Arc::new(DuckDbRepository::new(&db_path)?);
        repository.ensure_schema()?;

        let auth_service = AuthService::new(Arc::clone(&repository));
        let teller_service = TellerService::new(Arc::clone(&repository));
        let history_service = HistoryService::new(Arc::clone(&repository));
        let status_service = StatusService::new(Arc::clone(&repository));

        Ok(Self {
            config,
            repository,
            auth_service,
            teller_service,
            history_service,
            status_service,
        })
    }
}
