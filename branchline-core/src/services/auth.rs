//! Authentication service - login and session lifecycle

use std::sync::Arc;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::Result;
use crate::domain::{Session, SessionAction};

/// Service for authenticating users and recording session events
pub struct AuthService {
    repository: Arc<DuckDbRepository>,
}

impl AuthService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    /// Authenticate a user and open a session
    ///
    /// A successful login appends a "Login" session event and returns a
    /// session seeded with the stored balance. A credential mismatch
    /// returns None with no store writes.
    pub fn login(&self, user_id: i64, pin: &str) -> Result<Option<Session>> {
        let account = match self.repository.authenticate(user_id, pin)? {
            Some(account) => account,
            None => return Ok(None),
        };

        self.repository
            .record_session_event(account.id, SessionAction::Login)?;

        Ok(Some(Session::new(account.id, account.balance)))
    }

    /// Close a session, appending a "Logout" session event
    ///
    /// Consumes the session so it cannot be used after logout.
    pub fn logout(&self, session: Session) -> Result<()> {
        self.repository
            .record_session_event(session.user_id, SessionAction::Logout)
    }
}
