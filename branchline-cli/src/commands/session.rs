//! Interactive banking session
//!
//! This is what runs when `bl` is invoked with no subcommand: a login
//! prompt followed by the menu loop. All session state lives in the
//! `Session` value owned by the loop; nothing is process-global.
//!
//! Input policy: malformed ids and amounts re-prompt at the same prompt,
//! an unrecognized menu choice prints "Invalid choice. Try again." and
//! the menu is shown again. A store fault during an operation prints a
//! diagnostic and returns to the menu with the session intact.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use rust_decimal::Decimal;

use branchline_core::{BranchlineContext, Error, LogEvent, LoggingService, Session, TellerOutcome};

use super::{get_context, get_logger, log_event};
use crate::output::{self, format_amount};

pub fn run() -> Result<()> {
    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("An interactive session requires a terminal. See 'bl --help' for scripted commands.");
    }

    let logger = get_logger();
    let ctx = get_context()?;

    if ctx.config.demo_mode {
        output::info("Demo mode is on; you are banking against the demo database.");
    }

    let user_id: i64 = Input::new().with_prompt("Enter User ID").interact_text()?;
    let pin: String = Password::new().with_prompt("Enter PIN").interact()?;

    let session = match ctx.auth_service.login(user_id, &pin) {
        Ok(Some(session)) => session,
        Ok(None) => {
            println!("Invalid credentials.");
            println!("Goodbye!");
            log_event(&logger, LogEvent::new("login_rejected"));
            return Ok(());
        }
        Err(e) => {
            output::error(&format!("Error during login: {}", e));
            println!("Goodbye!");
            log_event(
                &logger,
                LogEvent::new("login_failed").with_error(e.to_string()),
            );
            return Ok(());
        }
    };

    log_event(&logger, LogEvent::new("login_succeeded"));
    println!(
        "Login successful! Your current balance is: {}",
        format_amount(session.balance)
    );

    run_menu_loop(&ctx, session, &logger)
}

fn run_menu_loop(
    ctx: &BranchlineContext,
    mut session: Session,
    logger: &Option<LoggingService>,
) -> Result<()> {
    loop {
        show_menu();
        let choice: String = Input::new()
            .with_prompt("Enter your choice")
            .interact_text()?;

        match choice.trim() {
            "1" => show_history(ctx, &session),
            "2" => withdraw(ctx, &mut session, logger)?,
            "3" => deposit(ctx, &mut session, logger)?,
            "4" => transfer(ctx, &mut session, logger)?,
            "5" => {
                if let Err(e) = ctx.auth_service.logout(session) {
                    output::error(&format!("Error recording session: {}", e));
                }
                println!("You have exited the system.");
                log_event(logger, LogEvent::new("session_ended"));
                return Ok(());
            }
            _ => println!("Invalid choice. Try again."),
        }
    }
}

fn show_menu() {
    println!();
    println!("{}", "Branchline Menu:".bold());
    println!("1. Transaction History");
    println!("2. Withdraw");
    println!("3. Deposit");
    println!("4. Transfer");
    println!("5. Quit");
}

fn show_history(ctx: &BranchlineContext, session: &Session) {
    let records = match ctx.history_service.transactions(session.user_id) {
        Ok(records) => records,
        Err(e) => {
            output::error(&format!("Error fetching transaction history: {}", e));
            return;
        }
    };

    println!("Transaction History:");
    if records.is_empty() {
        println!("(no transactions yet)");
        return;
    }
    for record in records {
        println!(
            "{} - {}: {}",
            record.transaction_date.format("%Y-%m-%d %H:%M:%S"),
            record.kind.as_str(),
            format_amount(record.amount)
        );
    }
}

fn withdraw(
    ctx: &BranchlineContext,
    session: &mut Session,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let amount: Decimal = Input::new()
        .with_prompt("Enter amount to withdraw")
        .interact_text()?;

    match ctx.teller_service.withdraw(session.user_id, amount) {
        Ok(TellerOutcome::Applied { balance }) => {
            session.balance = balance;
            println!(
                "Withdrawal successful. Your new balance is: {}",
                format_amount(balance)
            );
            log_event(logger, LogEvent::new("withdrawal_completed"));
        }
        Ok(TellerOutcome::InsufficientFunds) => println!("Insufficient balance."),
        Err(Error::Validation(msg)) => println!("{}", msg),
        Err(e) => {
            output::error(&format!("Error updating balance: {}", e));
            log_event(
                logger,
                LogEvent::new("withdrawal_failed").with_error(e.to_string()),
            );
        }
    }

    Ok(())
}

fn deposit(
    ctx: &BranchlineContext,
    session: &mut Session,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let amount: Decimal = Input::new()
        .with_prompt("Enter amount to deposit")
        .interact_text()?;

    match ctx.teller_service.deposit(session.user_id, amount) {
        Ok(TellerOutcome::Applied { balance }) => {
            session.balance = balance;
            println!(
                "Deposit successful. Your new balance is: {}",
                format_amount(balance)
            );
            log_event(logger, LogEvent::new("deposit_completed"));
        }
        Ok(TellerOutcome::InsufficientFunds) => println!("Insufficient balance."),
        Err(Error::Validation(msg)) => println!("{}", msg),
        Err(e) => {
            output::error(&format!("Error updating balance: {}", e));
            log_event(
                logger,
                LogEvent::new("deposit_failed").with_error(e.to_string()),
            );
        }
    }

    Ok(())
}

fn transfer(
    ctx: &BranchlineContext,
    session: &mut Session,
    logger: &Option<LoggingService>,
) -> Result<()> {
    let recipient: i64 = Input::new()
        .with_prompt("Enter recipient user ID")
        .interact_text()?;
    let amount: Decimal = Input::new()
        .with_prompt("Enter amount to transfer")
        .interact_text()?;

    match ctx.teller_service.transfer(session.user_id, recipient, amount) {
        Ok(TellerOutcome::Applied { balance }) => {
            session.balance = balance;
            println!(
                "Transfer successful. Your new balance is: {}",
                format_amount(balance)
            );
            log_event(logger, LogEvent::new("transfer_completed"));
        }
        Ok(TellerOutcome::InsufficientFunds) => println!("Insufficient balance."),
        Err(Error::Validation(msg)) => println!("{}", msg),
        Err(Error::UnknownRecipient(id)) => {
            println!("No account with id {}. Transfer cancelled.", id)
        }
        Err(e @ Error::TransferInconsistent(_)) => {
            output::error(&format!("Transfer rolled back: {}", e));
            log_event(
                logger,
                LogEvent::new("transfer_rolled_back").with_error(e.to_string()),
            );
        }
        Err(e) => {
            output::error(&format!("Error during transfer: {}", e));
            log_event(
                logger,
                LogEvent::new("transfer_failed").with_error(e.to_string()),
            );
        }
    }

    Ok(())
}
