//! History service - read-only views over the audit trails

use std::sync::Arc;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::Result;
use crate::domain::{SessionEvent, TransactionRecord};

/// Service for querying transaction and session history
pub struct HistoryService {
    repository: Arc<DuckDbRepository>,
}

impl HistoryService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    /// Transaction records for one user, newest first
    pub fn transactions(&self, user_id: i64) -> Result<Vec<TransactionRecord>> {
        self.repository.get_transactions_by_user(user_id)
    }

    /// Session events for one user, newest first
    pub fn session_events(&self, user_id: i64) -> Result<Vec<SessionEvent>> {
        self.repository.get_session_events(user_id)
    }
}
