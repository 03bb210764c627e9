//! Batch invoice generation planning.
//!
//! The engine plans a posting run purely in memory: rule filtering, grade
//! applicability, invoice numbering, routing attribution, and due dates. The
//! repository executes the plan in chunked transactions.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{PostingEngine, PostingRequest};
pub use error::PostingError;
pub use types::{
    BillingFrequency, BillingRule, InvoiceSeed, PostingPlan, PostingRunStatus, StudentSnapshot,
};
