//! Rule-driven dunning reminder engine.
//!
//! Pure rule matching, deduplication, and message rendering. The repository
//! loads invoice snapshots and rules, plans a run through this module, then
//! enqueues delivery jobs and writes logs.

pub mod engine;
pub mod error;
pub mod template;
pub mod types;

pub use engine::{LastSentIndex, PlanOutcome, plan_run, select_rule};
pub use error::ReminderError;
pub use template::{render, resolve_template, tokens_for};
pub use types::{
    InvoiceReminderSnapshot, PlannedReminder, ReminderChannel, ReminderLogStatus, ReminderRule,
    ReminderTrigger, RunCounts,
};
