//! The fixed accounts seeded into the demo bank. PINs are deliberately
//! guessable and printed by `bl demo on`.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::Account;

pub fn generate_demo_accounts() -> Vec<Account> {
    let now = Utc::now();

    let seed = |id: i64, pin: &str, cents: i64| Account {
        id,
        pin: pin.to_string(),
        balance: Decimal::new(cents, 2),
        created_at: now,
        updated_at: now,
    };

    vec![
        seed(1, "1234", 10000),  // $100.00
        seed(2, "2345", 532575), // $5,325.75
        seed(3, "3456", 98040),  // $980.40
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_accounts_are_valid() {
        let accounts = generate_demo_accounts();
        assert_eq!(accounts.len(), 3);
        for account in &accounts {
            assert!(account.validate().is_ok());
        }
    }

    #[test]
    fn test_demo_account_ids_are_unique() {
        let accounts = generate_demo_accounts();
        let mut ids: Vec<i64> = accounts.iter().map(|a| a.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), accounts.len());
    }
}
