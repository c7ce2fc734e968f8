#![allow(dead_code)]

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use finance_core::currency::Currency;
use finance_core::ledger::{Account, Ledger, Operation};
use finance_core::payments::PaymentDraft;
use finance_core::schedule::RecurrenceRule;

/// Ledger with a single UAH account, plus that account's id.
pub fn ledger_with_account() -> (Ledger, Uuid) {
    let mut ledger = Ledger::new("Office");
    let account = ledger.add_account(Account::new("Main", Currency::Uah, 1000.0));
    (ledger, account)
}

pub fn instant(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn at_ten() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap()
}

pub fn monthly_draft(account: Uuid, day: u32) -> PaymentDraft {
    PaymentDraft {
        account_id: account,
        currency: Currency::Uah,
        operation: Operation::Debit,
        amount: 500.0,
        category: "Rent".into(),
        subcategory: None,
        rule: RecurrenceRule::monthly(day, at_ten()),
    }
}
