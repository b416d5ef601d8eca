//! Demo command - switch the seeded demo bank on and off

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use branchline_core::adapters::demo::generate_demo_accounts;
use branchline_core::services::DemoService;
use branchline_core::LogEvent;

use super::{get_branchline_dir, get_logger, log_event};
use crate::output::{self, format_amount};

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Turn demo mode on and seed the demo accounts
    #[command(name = "on")]
    On,
    /// Turn demo mode off
    #[command(name = "off")]
    Off,
    /// Report whether demo mode is active
    Status,
}

pub fn run(command: Option<DemoCommands>) -> Result<()> {
    let branchline_dir = get_branchline_dir();
    std::fs::create_dir_all(&branchline_dir)?;
    let demo_service = DemoService::new(&branchline_dir);

    match command {
        Some(DemoCommands::On) => {
            let logger = get_logger();
            demo_service.enable()?;
            log_event(&logger, LogEvent::new("demo_enabled").with_command("demo"));

            output::success("Demo mode enabled");
            println!("The demo bank has been provisioned. Log in with 'bl' using:");
            println!();

            let mut table = output::create_table();
            table.set_header(vec!["User ID", "PIN", "Balance"]);
            for account in generate_demo_accounts() {
                table.add_row(vec![
                    account.id.to_string(),
                    account.pin.clone(),
                    format_amount(account.balance),
                ]);
            }
            println!("{}", table);
            Ok(())
        }
        Some(DemoCommands::Off) => {
            let logger = get_logger();
            // Only flips the config flag; the demo database stays on disk
            demo_service.disable(false)?;
            log_event(&logger, LogEvent::new("demo_disabled").with_command("demo"));

            output::warning("Demo mode disabled");
            Ok(())
        }
        Some(DemoCommands::Status) | None => {
            if demo_service.is_enabled()? {
                println!("Demo mode is {}", "ON".green());
            } else {
                println!("Demo mode is {}", "OFF".yellow());
            }
            Ok(())
        }
    }
}
