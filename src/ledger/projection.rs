//! Balance replay over an account's transaction history.
//!
//! Balances are never maintained incrementally: every projection replays the
//! full history from the opening balance, so the transaction log stays the
//! single source of truth.

use uuid::Uuid;

use super::account::Account;
use super::transaction::{Operation, Transaction};

/// One projected statement row: the posting plus the running balance around it.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementLine {
    pub transaction: Transaction,
    pub balance_before: f64,
    pub balance_after: f64,
}

/// Full projection of an account: annotated history plus closing aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountStatement {
    pub account_id: Uuid,
    pub opening_balance: f64,
    pub closing_balance: f64,
    pub turnover_incoming: f64,
    pub turnover_outgoing: f64,
    pub lines: Vec<StatementLine>,
}

/// Replays `transactions` into running balances for `account`.
///
/// Ordering is by `(timestamp, id)`, never insertion order: manual entries
/// may be backdated, and the id tie-break keeps equal-timestamp replays
/// total. Projecting the same set twice yields identical output.
pub fn project(account: &Account, transactions: &[Transaction]) -> AccountStatement {
    let mut history: Vec<&Transaction> = transactions
        .iter()
        .filter(|txn| txn.account_id == account.id)
        .collect();
    history.sort_by_key(|txn| (txn.timestamp, txn.id));

    let mut running = account.opening_balance;
    let mut incoming = 0.0;
    let mut outgoing = 0.0;
    let mut lines = Vec::with_capacity(history.len());
    for txn in history {
        let balance_before = running;
        let balance_after = running + txn.signed_amount();
        match txn.operation {
            Operation::Credit => incoming += txn.amount,
            Operation::Debit => outgoing += txn.amount,
        }
        running = balance_after;
        lines.push(StatementLine {
            transaction: txn.clone(),
            balance_before,
            balance_after,
        });
    }

    AccountStatement {
        account_id: account.id,
        opening_balance: account.opening_balance,
        closing_balance: running,
        turnover_incoming: incoming,
        turnover_outgoing: outgoing,
        lines,
    }
}
