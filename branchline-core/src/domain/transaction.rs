//! Transaction record domain model

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of a balance-changing operation
///
/// Stored in the transactions table as the exact strings "Withdraw",
/// "Deposit" and "Transfer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Withdraw,
    Deposit,
    Transfer,
}

impl TransactionKind {
    /// The string stored in the transaction_type column
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Withdraw => "Withdraw",
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Transfer => "Transfer",
        }
    }

    /// Parse a stored transaction_type string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Withdraw" => Some(TransactionKind::Withdraw),
            "Deposit" => Some(TransactionKind::Deposit),
            "Transfer" => Some(TransactionKind::Transfer),
            _ => None,
        }
    }
}

/// One row of the append-only transaction audit trail
///
/// The amount is always the positive magnitude of the operation; the kind
/// says which direction the money moved. Transfers are recorded against
/// the sender only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub user_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub transaction_date: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_round_trip() {
        for kind in [
            TransactionKind::Withdraw,
            TransactionKind::Deposit,
            TransactionKind::Transfer,
        ] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_kind_parse_rejects_unknown() {
        assert_eq!(TransactionKind::parse("Refund"), None);
        assert_eq!(TransactionKind::parse("withdraw"), None);
        assert_eq!(TransactionKind::parse(""), None);
    }
}
