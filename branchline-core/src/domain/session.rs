//! Session domain model

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An authenticated terminal session
///
/// Created on a successful login and dropped when the user quits. The
/// cached balance is refreshed from the store after every mutation and is
/// used only for display; the store performs its own balance checks.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub balance: Decimal,
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: i64, balance: Decimal) -> Self {
        Session {
            user_id,
            balance,
            started_at: Utc::now(),
        }
    }
}

/// Lifecycle actions recorded in the user_sessions table
///
/// Stored as the exact strings "Login" and "Logout".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionAction {
    Login,
    Logout,
}

impl SessionAction {
    /// The string stored in the session_action column
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionAction::Login => "Login",
            SessionAction::Logout => "Logout",
        }
    }

    /// Parse a stored session_action string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Login" => Some(SessionAction::Login),
            "Logout" => Some(SessionAction::Logout),
            _ => None,
        }
    }
}

/// One row of the session audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub user_id: i64,
    pub action: SessionAction,
    pub session_time: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    #[test]
    fn test_session_caches_starting_balance() {
        let session = Session::new(1, Decimal::from_f64(100.0).unwrap());
        assert_eq!(session.user_id, 1);
        assert_eq!(session.balance, Decimal::from_f64(100.0).unwrap());
    }

    #[test]
    fn test_action_string_round_trip() {
        for action in [SessionAction::Login, SessionAction::Logout] {
            assert_eq!(SessionAction::parse(action.as_str()), Some(action));
        }
    }

    #[test]
    fn test_action_parse_rejects_unknown() {
        assert_eq!(SessionAction::parse("login"), None);
        assert_eq!(SessionAction::parse("Timeout"), None);
    }
}
