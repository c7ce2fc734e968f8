//! Regular payment definitions and their CRUD registry.

pub mod payment;
pub mod registry;

pub use payment::{PaymentStatus, RecurringPayment};
pub use registry::{PaymentDraft, PaymentRegistry};
