//! CRUD surface for regular-payment definitions.
//!
//! All writes validate here, before anything is scheduled; the scheduler can
//! assume every stored payment passed this gate at its last edit.

use uuid::Uuid;

use crate::currency::Currency;
use crate::errors::{CoreError, Result};
use crate::ledger::{Ledger, Operation};
use crate::schedule::RecurrenceRule;
use crate::time::Clock;

use super::payment::{PaymentStatus, RecurringPayment};

/// Fields the user supplies when creating a payment. Scheduling state is
/// computed here, never accepted from the caller.
#[derive(Debug, Clone)]
pub struct PaymentDraft {
    pub account_id: Uuid,
    pub currency: Currency,
    pub operation: Operation,
    pub amount: f64,
    pub category: String,
    pub subcategory: Option<String>,
    pub rule: RecurrenceRule,
}

pub struct PaymentRegistry;

impl PaymentRegistry {
    /// Validates the draft and registers it with its first `next_run_at`
    /// computed from the creation instant.
    pub fn create(ledger: &mut Ledger, draft: PaymentDraft, clock: &dyn Clock) -> Result<Uuid> {
        let now = clock.now();
        Self::validate(
            ledger,
            &draft.rule,
            draft.amount,
            draft.account_id,
            draft.currency,
        )?;
        let next_run_at = draft.rule.next_occurrence(now);
        let payment = RecurringPayment {
            id: Uuid::new_v4(),
            status: PaymentStatus::Active,
            account_id: draft.account_id,
            currency: draft.currency,
            operation: draft.operation,
            amount: draft.amount,
            category: draft.category,
            subcategory: draft.subcategory,
            rule: draft.rule,
            next_run_at,
            last_run_at: None,
            created_at: now,
        };
        let id = payment.id;
        ledger.payments.push(payment);
        ledger.touch();
        tracing::info!(payment = %id, next_run = %next_run_at, "regular payment created");
        Ok(id)
    }

    /// Applies a user edit. Scheduling state on the payload is ignored; the
    /// schedule restarts from the edit instant only when a rule field
    /// changed.
    pub fn update(ledger: &mut Ledger, updated: RecurringPayment, clock: &dyn Clock) -> Result<()> {
        let now = clock.now();
        Self::validate(
            ledger,
            &updated.rule,
            updated.amount,
            updated.account_id,
            updated.currency,
        )?;
        let existing = ledger
            .payment_mut(updated.id)
            .ok_or(CoreError::PaymentNotFound(updated.id))?;
        let rule_changed = existing.rule != updated.rule;
        existing.status = updated.status;
        existing.account_id = updated.account_id;
        existing.currency = updated.currency;
        existing.operation = updated.operation;
        existing.amount = updated.amount;
        existing.category = updated.category;
        existing.subcategory = updated.subcategory;
        if rule_changed {
            existing.rule = updated.rule;
            existing.next_run_at = existing.rule.next_occurrence(now);
        }
        ledger.touch();
        Ok(())
    }

    pub fn delete(ledger: &mut Ledger, id: Uuid) -> Result<()> {
        let before = ledger.payments.len();
        ledger.payments.retain(|payment| payment.id != id);
        if ledger.payments.len() == before {
            return Err(CoreError::PaymentNotFound(id));
        }
        ledger.touch();
        Ok(())
    }

    /// Clones a payment under a fresh id with an independent schedule
    /// anchored at the duplication instant.
    pub fn duplicate(ledger: &mut Ledger, id: Uuid, clock: &dyn Clock) -> Result<Uuid> {
        let now = clock.now();
        let source = ledger
            .payment(id)
            .ok_or(CoreError::PaymentNotFound(id))?
            .clone();
        let copy = RecurringPayment {
            id: Uuid::new_v4(),
            next_run_at: source.rule.next_occurrence(now),
            last_run_at: None,
            created_at: now,
            ..source
        };
        let copy_id = copy.id;
        ledger.payments.push(copy);
        ledger.touch();
        Ok(copy_id)
    }

    pub fn list(ledger: &Ledger) -> &[RecurringPayment] {
        &ledger.payments
    }

    fn validate(
        ledger: &Ledger,
        rule: &RecurrenceRule,
        amount: f64,
        account_id: Uuid,
        currency: Currency,
    ) -> Result<()> {
        rule.validate()?;
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::Validation(format!(
                "payment amount must be positive, got {amount}"
            )));
        }
        let account = ledger
            .account(account_id)
            .ok_or(CoreError::AccountNotFound(account_id))?;
        if account.currency != currency {
            return Err(CoreError::Validation(format!(
                "payment currency {} does not match account currency {}",
                currency, account.currency
            )));
        }
        Ok(())
    }
}
