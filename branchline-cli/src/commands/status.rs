//! Status command - show bank status and summary

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output::{self, format_amount};

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Branchline Status".bold());
    println!();

    // Summary table (vertical key-value pairs)
    let mut table = output::create_table();
    table.add_row(vec!["Accounts", &status.total_accounts.to_string()]);
    table.add_row(vec!["Transactions", &status.total_transactions.to_string()]);
    table.add_row(vec![
        "Session events",
        &status.total_session_events.to_string(),
    ]);

    println!("{}", table);
    println!();

    // Print transaction date range
    if let (Some(earliest), Some(latest)) = (&status.date_range.earliest, &status.date_range.latest)
    {
        println!("Transaction range: {} to {}", earliest, latest);
        println!();
    }

    // Per-account balances (no PINs here)
    if !status.accounts.is_empty() {
        println!("{}", "Accounts".bold());
        let mut table = output::create_table();
        table.set_header(vec!["User ID", "Balance"]);
        for account in &status.accounts {
            table.add_row(vec![account.id.to_string(), format_amount(account.balance)]);
        }
        println!("{}", table);
    }

    Ok(())
}
