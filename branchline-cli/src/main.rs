//! Branchline CLI - Terminal banking at the command line

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{demo, logs, session, status};

/// Branchline - terminal banking
///
/// Running with no subcommand starts an interactive banking session.
#[derive(Parser)]
#[command(name = "bl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize accounts and activity in the bank database
    Status {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Switch the seeded demo bank on or off
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// Inspect or prune the application log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Status { json }) => status::run(json),
        Some(Commands::Demo { command }) => demo::run(command),
        Some(Commands::Logs { command }) => logs::run(command),
        None => session::run(),
    }
}
