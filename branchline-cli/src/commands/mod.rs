//! Command handlers plus the shared plumbing they sit on

pub mod demo;
pub mod logs;
pub mod session;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use branchline_core::{BranchlineContext, LogEvent, LoggingService};

/// Best-effort logger; None when the log store cannot be opened,
/// because a broken log file must not take the commands down with it.
pub fn get_logger() -> Option<LoggingService> {
    let branchline_dir = get_branchline_dir();
    std::fs::create_dir_all(&branchline_dir).ok()?;
    LoggingService::new(&branchline_dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Record an event if a logger is available; failures are swallowed.
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Data directory: `BRANCHLINE_DIR` when set, otherwise `~/.branchline`
pub fn get_branchline_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BRANCHLINE_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".branchline")
    }
}

/// Open the database and wire up the services, creating the data
/// directory on first run.
pub fn get_context() -> Result<BranchlineContext> {
    let branchline_dir = get_branchline_dir();

    std::fs::create_dir_all(&branchline_dir)
        .with_context(|| format!("Failed to create branchline directory: {:?}", branchline_dir))?;

    BranchlineContext::new(&branchline_dir).context("Failed to initialize branchline context")
}
