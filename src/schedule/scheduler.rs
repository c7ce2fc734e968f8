//! Periodic due-payment scan and posting.
//!
//! One cooperative task drives the whole schedule: ticks run strictly in
//! sequence, and a tick that outlives the poll interval delays the next one
//! instead of overlapping it.

use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{CoreError, Result};
use crate::ledger::{Ledger, Transaction};
use crate::storage::StorageBackend;
use crate::time::Clock;

const CATCH_UP_GUARD: u32 = 10_000;

/// Outcome of a single posted payment.
#[derive(Debug, Clone)]
pub struct PostedPayment {
    pub payment_id: Uuid,
    pub transaction_id: Uuid,
    /// Occurrences whose due time had already elapsed and were folded into
    /// this single posting.
    pub missed_periods: u32,
}

/// Per-item problem encountered during a tick. Never aborts the batch.
#[derive(Debug, Clone)]
pub struct SkippedPayment {
    pub payment_id: Uuid,
    pub reason: String,
}

/// What one scheduler pass did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub posted: Vec<PostedPayment>,
    pub skipped: Vec<SkippedPayment>,
}

impl TickReport {
    pub fn changed(&self) -> bool {
        !self.posted.is_empty()
    }
}

/// Scans every active, due payment once, posting exactly one transaction per
/// payment and advancing its schedule from the previous `next_run_at` (never
/// from `now`, so tick jitter cannot accumulate drift).
pub fn run_tick(ledger: &mut Ledger, now: DateTime<Utc>) -> TickReport {
    let mut report = TickReport::default();
    let due: Vec<Uuid> = ledger
        .payments
        .iter()
        .filter(|payment| payment.is_due(now))
        .map(|payment| payment.id)
        .collect();

    for payment_id in due {
        match post_due_payment(ledger, payment_id, now) {
            Ok(posted) => {
                if posted.missed_periods > 0 {
                    tracing::warn!(
                        payment = %posted.payment_id,
                        missed = posted.missed_periods,
                        "schedule drift caught up with a single posting"
                    );
                }
                tracing::info!(
                    payment = %posted.payment_id,
                    transaction = %posted.transaction_id,
                    "regular payment posted"
                );
                report.posted.push(posted);
            }
            Err(err) => {
                tracing::warn!(payment = %payment_id, error = %err, "payment skipped this tick");
                report.skipped.push(SkippedPayment {
                    payment_id,
                    reason: err.to_string(),
                });
            }
        }
    }

    report
}

/// Posting and schedule advance are one unit: the payment is only mutated
/// after the append succeeded, so a failed posting leaves the occurrence due
/// for the next tick.
fn post_due_payment(
    ledger: &mut Ledger,
    payment_id: Uuid,
    now: DateTime<Utc>,
) -> Result<PostedPayment> {
    let payment = ledger
        .payment(payment_id)
        .ok_or(CoreError::PaymentNotFound(payment_id))?
        .clone();

    let mut transaction = Transaction::new(
        payment.account_id,
        payment.currency,
        payment.operation,
        payment.amount,
        now,
        payment.category.clone(),
    );
    transaction.subcategory = payment.subcategory.clone();
    transaction.source_payment_id = Some(payment.id);

    let transaction_id = ledger
        .append_transaction(transaction)
        .map_err(|err| CoreError::Posting(err.to_string()))?;

    // Advance from the previous due instant. Occurrences that elapsed while
    // the process was dormant collapse into the single posting above.
    let previous = payment.next_run_at;
    let mut next = payment.rule.next_occurrence(previous);
    let mut missed = 0u32;
    while next <= now && missed < CATCH_UP_GUARD {
        next = payment.rule.next_occurrence(next);
        missed += 1;
    }

    if let Some(stored) = ledger.payment_mut(payment_id) {
        stored.last_run_at = Some(previous);
        stored.next_run_at = next;
    }
    ledger.touch();

    Ok(PostedPayment {
        payment_id,
        transaction_id,
        missed_periods: missed,
    })
}

/// Drives ticks against persisted state on a fixed poll interval.
pub struct PaymentScheduler {
    storage: Box<dyn StorageBackend>,
    clock: Box<dyn Clock>,
    ledger_name: String,
    poll_interval: Duration,
}

impl PaymentScheduler {
    pub fn new(
        storage: Box<dyn StorageBackend>,
        clock: Box<dyn Clock>,
        ledger_name: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            storage,
            clock,
            ledger_name: ledger_name.into(),
            poll_interval,
        }
    }

    /// Loads the ledger, runs one tick, and saves when anything posted.
    /// Posting and schedule advance land durably together or not at all.
    pub fn poll_once(&self) -> Result<TickReport> {
        let mut ledger = self.storage.load(&self.ledger_name)?;
        let report = run_tick(&mut ledger, self.clock.now());
        if report.changed() {
            self.storage.save(&ledger, &self.ledger_name)?;
        }
        Ok(report)
    }

    /// Blocking poll loop. A failed poll is logged and retried on the next
    /// interval; due occurrences stay due until a poll persists them.
    pub fn run(&self) {
        loop {
            match self.poll_once() {
                Ok(report) if report.changed() || !report.skipped.is_empty() => {
                    tracing::info!(
                        posted = report.posted.len(),
                        skipped = report.skipped.len(),
                        "scheduler tick finished"
                    );
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(error = %err, "scheduler tick failed");
                }
            }
            thread::sleep(self.poll_interval);
        }
    }
}
