use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;

/// A money account. Its live balance is always recomputed from the opening
/// balance plus the full transaction history, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub currency: Currency,
    pub opening_balance: f64,
}

impl Account {
    pub fn new(name: impl Into<String>, currency: Currency, opening_balance: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            currency,
            opening_balance,
        }
    }
}
