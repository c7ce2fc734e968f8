//! Ledger domain models and balance projection.

pub mod account;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod projection;
pub mod transaction;

pub use account::Account;
pub use ledger::Ledger;
pub use projection::{project, AccountStatement, StatementLine};
pub use transaction::{Operation, Transaction};
