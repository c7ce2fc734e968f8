mod common;

use chrono::Duration;
use uuid::Uuid;

use finance_core::currency::Currency;
use finance_core::errors::CoreError;
use finance_core::payments::{PaymentRegistry, PaymentStatus};
use finance_core::schedule::RecurrenceRule;
use finance_core::time::{Clock, ManualClock};

use common::{at_ten, instant, ledger_with_account, monthly_draft};

#[test]
fn create_computes_first_next_run_from_creation_instant() {
    let (mut ledger, account) = ledger_with_account();
    let clock = ManualClock::new(instant(2025, 1, 5, 0, 0));

    let id = PaymentRegistry::create(&mut ledger, monthly_draft(account, 1), &clock)
        .expect("create payment");

    let payment = ledger.payment(id).expect("stored payment");
    assert_eq!(payment.next_run_at, instant(2025, 2, 1, 10, 0));
    assert_eq!(payment.last_run_at, None);
    assert_eq!(payment.status, PaymentStatus::Active);
    assert_eq!(payment.created_at, clock.now());
}

#[test]
fn create_rejects_bad_definitions() {
    let (mut ledger, account) = ledger_with_account();
    let clock = ManualClock::new(instant(2025, 1, 5, 0, 0));

    let mut bad_rule = monthly_draft(account, 1);
    bad_rule.rule = RecurrenceRule::monthly(32, at_ten());
    assert!(matches!(
        PaymentRegistry::create(&mut ledger, bad_rule, &clock),
        Err(CoreError::Validation(_))
    ));

    let mut bad_amount = monthly_draft(account, 1);
    bad_amount.amount = 0.0;
    assert!(matches!(
        PaymentRegistry::create(&mut ledger, bad_amount, &clock),
        Err(CoreError::Validation(_))
    ));

    let mut bad_account = monthly_draft(account, 1);
    bad_account.account_id = Uuid::new_v4();
    assert!(matches!(
        PaymentRegistry::create(&mut ledger, bad_account, &clock),
        Err(CoreError::AccountNotFound(_))
    ));

    let mut bad_currency = monthly_draft(account, 1);
    bad_currency.currency = Currency::Usd;
    assert!(matches!(
        PaymentRegistry::create(&mut ledger, bad_currency, &clock),
        Err(CoreError::Validation(_))
    ));

    assert!(PaymentRegistry::list(&ledger).is_empty());
}

#[test]
fn update_recomputes_schedule_only_when_rule_changes() {
    let (mut ledger, account) = ledger_with_account();
    let clock = ManualClock::new(instant(2025, 1, 5, 0, 0));
    let id = PaymentRegistry::create(&mut ledger, monthly_draft(account, 1), &clock)
        .expect("create payment");

    clock.set(instant(2025, 3, 10, 0, 0));

    let mut edited = ledger.payment(id).expect("payment").clone();
    edited.amount = 750.0;
    PaymentRegistry::update(&mut ledger, edited, &clock).expect("amount edit");
    let payment = ledger.payment(id).expect("payment");
    assert_eq!(payment.amount, 750.0);
    assert_eq!(payment.next_run_at, instant(2025, 2, 1, 10, 0));

    let mut rescheduled = payment.clone();
    rescheduled.rule = RecurrenceRule::monthly(15, at_ten());
    PaymentRegistry::update(&mut ledger, rescheduled, &clock).expect("rule edit");
    let payment = ledger.payment(id).expect("payment");
    assert_eq!(payment.next_run_at, instant(2025, 4, 15, 10, 0));
}

#[test]
fn update_ignores_caller_supplied_schedule_state() {
    let (mut ledger, account) = ledger_with_account();
    let clock = ManualClock::new(instant(2025, 1, 5, 0, 0));
    let id = PaymentRegistry::create(&mut ledger, monthly_draft(account, 1), &clock)
        .expect("create payment");

    let mut edited = ledger.payment(id).expect("payment").clone();
    edited.next_run_at = instant(2030, 1, 1, 0, 0);
    edited.last_run_at = Some(instant(2020, 1, 1, 0, 0));
    PaymentRegistry::update(&mut ledger, edited, &clock).expect("edit");

    let payment = ledger.payment(id).expect("payment");
    assert_eq!(payment.next_run_at, instant(2025, 2, 1, 10, 0));
    assert_eq!(payment.last_run_at, None);
}

#[test]
fn delete_removes_payment() {
    let (mut ledger, account) = ledger_with_account();
    let clock = ManualClock::new(instant(2025, 1, 5, 0, 0));
    let id = PaymentRegistry::create(&mut ledger, monthly_draft(account, 1), &clock)
        .expect("create payment");

    PaymentRegistry::delete(&mut ledger, id).expect("delete");
    assert!(PaymentRegistry::list(&ledger).is_empty());
    assert!(matches!(
        PaymentRegistry::delete(&mut ledger, id),
        Err(CoreError::PaymentNotFound(_))
    ));
}

#[test]
fn duplicate_gets_fresh_id_and_independent_schedule() {
    let (mut ledger, account) = ledger_with_account();
    let clock = ManualClock::new(instant(2025, 1, 5, 0, 0));
    let original = PaymentRegistry::create(&mut ledger, monthly_draft(account, 1), &clock)
        .expect("create payment");

    clock.advance(Duration::days(64));
    let copy = PaymentRegistry::duplicate(&mut ledger, original, &clock).expect("duplicate");

    assert_ne!(copy, original);
    let source = ledger.payment(original).expect("original").clone();
    let duplicated = ledger.payment(copy).expect("copy");
    assert_eq!(source.next_run_at, instant(2025, 2, 1, 10, 0));
    assert_eq!(duplicated.next_run_at, instant(2025, 4, 1, 10, 0));
    assert_eq!(duplicated.last_run_at, None);
    assert_eq!(duplicated.amount, source.amount);
    assert_eq!(duplicated.category, source.category);
}
