#![doc(test(attr(deny(warnings))))]

//! Finance Core implements the scheduling and ledger backbone of the
//! business console: recurrence rules for regular payments, the polling
//! scheduler that posts them, balance projection over the transaction log,
//! and dated exchange-rate snapshots.

pub mod config;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod payments;
pub mod schedule;
pub mod storage;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
