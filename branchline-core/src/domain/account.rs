//! The account row as the rest of the crate sees it

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bank account owned by a single user
///
/// The account id doubles as the user id: this is a one-account-per-user
/// bank. PINs are stored and compared as plain strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub pin: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Fresh account with both timestamps set to now
    pub fn new(id: i64, pin: impl Into<String>, balance: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id,
            pin: pin.into(),
            balance,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checked before an account is written to the store
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.id <= 0 {
            return Err("account id must be positive");
        }
        if self.pin.trim().is_empty() {
            return Err("pin cannot be empty");
        }
        if self.balance < Decimal::ZERO {
            return Err("balance cannot be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_pin_and_negative_balance() {
        let mut account = Account::new(1, "1234", Decimal::new(10000, 2));
        assert!(account.validate().is_ok());

        account.pin = "".to_string();
        assert!(account.validate().is_err());

        account.pin = "1234".to_string();
        account.balance = Decimal::new(-100, 2);
        assert!(account.validate().is_err());
    }

    #[test]
    fn test_account_id_must_be_positive() {
        let account = Account::new(0, "1234", Decimal::ZERO);
        assert!(account.validate().is_err());
    }
}
