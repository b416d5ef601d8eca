//! Teller service - balance-changing operations
//!
//! All three operations validate input first, then hand the decision to
//! the store's conditional update. Insufficient funds is a normal
//! outcome, not an error.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::{Error, Result};
use crate::domain::TransactionKind;

/// Outcome of a balance-changing operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TellerOutcome {
    /// The change was applied; the enclosed value is the new balance
    Applied { balance: Decimal },
    /// The store refused the change because funds were insufficient
    InsufficientFunds,
}

/// Service for withdrawals, deposits and transfers
pub struct TellerService {
    repository: Arc<DuckDbRepository>,
}

impl TellerService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    /// Add an amount to the user's balance and append a "Deposit" record
    pub fn deposit(&self, user_id: i64, amount: Decimal) -> Result<TellerOutcome> {
        validate_amount(amount)?;

        match self
            .repository
            .apply_balance_change(user_id, amount, TransactionKind::Deposit)?
        {
            Some(balance) => Ok(TellerOutcome::Applied { balance }),
            None => Ok(TellerOutcome::InsufficientFunds),
        }
    }

    /// Subtract an amount from the user's balance and append a "Withdraw"
    /// record; refused when the balance would go negative
    pub fn withdraw(&self, user_id: i64, amount: Decimal) -> Result<TellerOutcome> {
        validate_amount(amount)?;

        match self
            .repository
            .apply_balance_change(user_id, -amount, TransactionKind::Withdraw)?
        {
            Some(balance) => Ok(TellerOutcome::Applied { balance }),
            None => Ok(TellerOutcome::InsufficientFunds),
        }
    }

    /// Move an amount to another account as one atomic unit
    ///
    /// The recipient must exist before any write is attempted; an unknown
    /// id is an Error::UnknownRecipient, not a store fault. Only the
    /// sender gets a transaction record.
    pub fn transfer(&self, from_user: i64, to_user: i64, amount: Decimal) -> Result<TellerOutcome> {
        validate_amount(amount)?;

        if from_user == to_user {
            return Err(Error::validation("Cannot transfer to your own account"));
        }

        if self.repository.get_account(to_user)?.is_none() {
            return Err(Error::UnknownRecipient(to_user));
        }

        match self.repository.transfer_funds(from_user, to_user, amount)? {
            Some(balance) => Ok(TellerOutcome::Applied { balance }),
            None => Ok(TellerOutcome::InsufficientFunds),
        }
    }
}

/// Validate a user-entered amount: positive, at most two decimal places
fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation("Amount must be greater than zero"));
    }
    if amount.scale() > 2 {
        return Err(Error::validation(
            "Amount cannot have more than two decimal places",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount_accepts_two_decimals() {
        assert!(validate_amount(Decimal::new(5000, 2)).is_ok());
        assert!(validate_amount(Decimal::new(1, 2)).is_ok());
        assert!(validate_amount(Decimal::new(42, 0)).is_ok());
    }

    #[test]
    fn test_validate_amount_rejects_zero_and_negative() {
        assert!(validate_amount(Decimal::ZERO).is_err());
        assert!(validate_amount(Decimal::new(-100, 2)).is_err());
    }

    #[test]
    fn test_validate_amount_rejects_sub_cent_precision() {
        assert!(validate_amount(Decimal::new(10001, 3)).is_err());
    }
}
