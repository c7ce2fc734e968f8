//! Recurrence rules and the due-payment scheduler.

pub mod rule;
pub mod scheduler;

pub use rule::{CycleAnchor, PeriodType, RecurrenceRule};
pub use scheduler::{run_tick, PaymentScheduler, PostedPayment, SkippedPayment, TickReport};
