pub mod json_backend;

use crate::errors::Result;
use crate::ledger::Ledger;

/// Abstraction over persistence backends. The core only ever loads and saves
/// the whole ledger document; no partial-write or query surface is assumed.
pub trait StorageBackend: Send + Sync {
    fn save(&self, ledger: &Ledger, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Ledger>;
    fn list_ledgers(&self) -> Result<Vec<String>>;
    fn backup(&self, ledger: &Ledger, name: &str, note: Option<&str>) -> Result<()>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<Ledger>;
}

pub use json_backend::JsonStorage;
