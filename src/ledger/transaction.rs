use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;

/// Direction of a posting relative to its account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Operation {
    Credit,
    Debit,
}

impl Operation {
    /// Sign applied to the amount when folding a balance.
    pub fn signum(&self) -> f64 {
        match self {
            Operation::Credit => 1.0,
            Operation::Debit => -1.0,
        }
    }
}

/// A single ledger posting. Rows are append-mostly; the scheduler only ever
/// adds new ones.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub account_id: Uuid,
    pub currency: Currency,
    pub operation: Operation,
    pub amount: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Set when the scheduler generated this posting from a regular payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_payment_id: Option<Uuid>,
}

impl Transaction {
    pub fn new(
        account_id: Uuid,
        currency: Currency,
        operation: Operation,
        amount: f64,
        timestamp: DateTime<Utc>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            account_id,
            currency,
            operation,
            amount,
            category: category.into(),
            subcategory: None,
            source_payment_id: None,
        }
    }

    /// Signed amount as it lands on the account balance.
    pub fn signed_amount(&self) -> f64 {
        self.operation.signum() * self.amount
    }
}
