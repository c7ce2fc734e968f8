use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::SnapshotBook;
use crate::errors::{CoreError, Result};
use crate::payments::RecurringPayment;

use super::{account::Account, transaction::Transaction};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The persisted aggregate: every account, posting, payment definition, and
/// rate snapshot, loaded and saved as one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub payments: Vec<RecurringPayment>,
    #[serde(default)]
    pub rates: SnapshotBook,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            accounts: Vec::new(),
            transactions: Vec::new(),
            payments: Vec::new(),
            rates: SnapshotBook::default(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn payment(&self, id: Uuid) -> Option<&RecurringPayment> {
        self.payments.iter().find(|payment| payment.id == id)
    }

    pub fn payment_mut(&mut self, id: Uuid) -> Option<&mut RecurringPayment> {
        self.payments.iter_mut().find(|payment| payment.id == id)
    }

    /// Validates and appends a posting. A nil id on the draft is replaced
    /// with a fresh one.
    pub fn append_transaction(&mut self, mut transaction: Transaction) -> Result<Uuid> {
        if !transaction.amount.is_finite() || transaction.amount <= 0.0 {
            return Err(CoreError::Validation(format!(
                "transaction amount must be positive, got {}",
                transaction.amount
            )));
        }
        let account = self
            .account(transaction.account_id)
            .ok_or(CoreError::AccountNotFound(transaction.account_id))?;
        if account.currency != transaction.currency {
            return Err(CoreError::Validation(format!(
                "transaction currency {} does not match account currency {}",
                transaction.currency, account.currency
            )));
        }
        if transaction.id.is_nil() {
            transaction.id = Uuid::new_v4();
        }
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        Ok(id)
    }

    /// Postings for one account, in insertion order. The projection orders
    /// them itself before replaying.
    pub fn transactions_for(&self, account_id: Uuid) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| txn.account_id == account_id)
            .collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
