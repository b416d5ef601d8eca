pub mod account;
pub mod result;
pub mod session;
pub mod transaction;

pub use account::Account;
pub use result::{Error, Result};
pub use session::{Session, SessionAction, SessionEvent};
pub use transaction::{TransactionKind, TransactionRecord};
