//! Logs command - view and manage operational logs

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use branchline_core::{LogEntry, LoggingService};

use super::get_branchline_dir;
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// List recent entries, newest first
    List {
        /// How many entries to print
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only entries with errors
        #[arg(long)]
        errors: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete old log entries
    Clear {
        /// Delete entries older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip the confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show log statistics and database location
    Stats {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: LogsCommands) -> Result<()> {
    let branchline_dir = get_branchline_dir();
    std::fs::create_dir_all(&branchline_dir)?;
    let service = LoggingService::new(&branchline_dir, env!("CARGO_PKG_VERSION"))?;

    match command {
        LogsCommands::List {
            limit,
            errors,
            json,
        } => list(&service, limit, errors, json),
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => clear(&service, older_than_days, force, json),
        LogsCommands::Stats { json } => stats(&service, json),
    }
}

fn list(service: &LoggingService, limit: usize, errors: bool, json: bool) -> Result<()> {
    let entries = if errors {
        service.get_errors(limit)?
    } else {
        service.get_recent(limit)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No log entries yet.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Time", "Event", "Command", "Error"]);
    for entry in &entries {
        table.add_row(vec![
            format_time(entry.timestamp),
            entry.event.clone(),
            entry.command.clone().unwrap_or_default(),
            error_cell(entry),
        ]);
    }
    println!("{}", table);

    Ok(())
}

fn clear(service: &LoggingService, older_than_days: u64, force: bool, json: bool) -> Result<()> {
    let cutoff_ms = (Utc::now() - Duration::days(older_than_days as i64)).timestamp_millis();

    // --json implies non-interactive use; only prompt in plain mode
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete log entries older than {} days?",
                older_than_days
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let deleted = service.delete_before(cutoff_ms)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
    } else {
        println!("Deleted {} log entries", deleted);
    }

    Ok(())
}

fn stats(service: &LoggingService, json: bool) -> Result<()> {
    let total = service.count()?;
    let error_count = service.get_errors(1000)?.len();
    let db_path = service.db_path();
    let size_bytes = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "total_entries": total,
                "error_count": error_count,
                "database_path": db_path.to_string_lossy(),
                "database_size_bytes": size_bytes,
            })
        );
        return Ok(());
    }

    println!("{}", "Log Statistics".bold());
    let mut table = output::create_table();
    table.add_row(vec!["Entries", &total.to_string()]);
    table.add_row(vec!["Errors", &error_count.to_string()]);
    table.add_row(vec!["Database", &db_path.display().to_string()]);
    table.add_row(vec!["Size", &format!("{} bytes", size_bytes)]);
    println!("{}", table);

    Ok(())
}

fn format_time(timestamp_ms: i64) -> String {
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

/// Error column: the message itself, shortened to keep rows readable
fn error_cell(entry: &LogEntry) -> String {
    match entry.error_message.as_deref() {
        Some(msg) if msg.chars().count() > 60 => {
            let short: String = msg.chars().take(57).collect();
            format!("{}...", short).red().to_string()
        }
        Some(msg) => msg.red().to_string(),
        None => String::new(),
    }
}
