//! Status service - account and audit-trail summaries

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::Result;

/// Read-only rollup of what is in the bank database
pub struct StatusService {
    repository: Arc<DuckDbRepository>,
}

impl StatusService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    pub fn get_status(&self) -> Result<StatusSummary> {
        let accounts = self.repository.get_accounts()?;
        let transaction_count = self.repository.get_transaction_count()?;
        let session_event_count = self.repository.get_session_event_count()?;
        let date_range = self.repository.get_transaction_date_range()?;

        Ok(StatusSummary {
            total_accounts: accounts.len() as i64,
            total_transactions: transaction_count,
            total_session_events: session_event_count,
            accounts: accounts
                .into_iter()
                .map(|a| AccountSummary {
                    id: a.id,
                    balance: a.balance,
                })
                .collect(),
            date_range,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub total_accounts: i64,
    pub total_transactions: i64,
    pub total_session_events: i64,
    pub accounts: Vec<AccountSummary>,
    pub date_range: DateRange,
}

/// Per-account line in the status output. PINs are never included.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}
