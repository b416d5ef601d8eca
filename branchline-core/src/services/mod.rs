//! One service per banking concern, all sharing the repository

mod auth;
mod demo;
mod history;
pub mod logging;
pub mod migration;
mod status;
mod teller;

pub use auth::AuthService;
pub use demo::DemoService;
pub use history::HistoryService;
pub use logging::{LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use status::{AccountSummary, DateRange, StatusService, StatusSummary};
pub use teller::{TellerOutcome, TellerService};
