//! The crate-wide error enum and its Result alias

use thiserror::Error;

/// What can go wrong anywhere in the core.
///
/// The menu loop needs to tell user mistakes (bad amounts, unknown
/// recipients) apart from store faults, so these are distinct variants
/// rather than one opaque error.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No account with id {0}")]
    UnknownRecipient(i64),

    #[error("Transfer left accounts inconsistent and was rolled back: {0}")]
    TransferInconsistent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Shorthand constructors for the message-carrying variants
impl Error {
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("amount must be positive");
        assert_eq!(err.to_string(), "Validation error: amount must be positive");
    }

    #[test]
    fn test_unknown_recipient_display() {
        let err = Error::UnknownRecipient(42);
        assert_eq!(err.to_string(), "No account with id 42");
    }

    #[test]
    fn test_duckdb_error_maps_to_database() {
        let err: Error = duckdb::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, Error::Database(_)));
    }
}
