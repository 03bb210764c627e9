//! Payment application and reversal planning.
//!
//! Pure validation and planning for the reconciliation service: the
//! repository wraps each plan in one transaction covering invoice, payment,
//! ledger entry, and summary together.

pub mod error;
pub mod idempotency;
pub mod service;
pub mod types;

pub use error::ReconciliationError;
pub use idempotency::manual_payment_key;
pub use service::{ApplicationPlan, ReconciliationService, ReversalPlan};
pub use types::{PaymentChannel, PaymentRecord, PaymentStatus};
