use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;
use crate::ledger::Operation;
use crate::schedule::RecurrenceRule;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    #[default]
    Active,
    Paused,
}

/// A standing order: what to post, where, and on which recurrence rule.
///
/// `next_run_at` is always derivable by applying the rule to
/// `last_run_at`-or-`created_at`, and only the scheduler moves the pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringPayment {
    pub id: Uuid,
    #[serde(default)]
    pub status: PaymentStatus,
    pub account_id: Uuid,
    pub currency: Currency,
    pub operation: Operation,
    pub amount: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub rule: RecurrenceRule,
    pub next_run_at: DateTime<Utc>,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RecurringPayment {
    pub fn is_active(&self) -> bool {
        matches!(self.status, PaymentStatus::Active)
    }

    /// Active and past due relative to `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.next_run_at <= now
    }
}
