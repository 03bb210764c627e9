//! Repository layer for database operations.
//!
//! Repositories load rows, hand them to the pure core planners, and execute
//! the resulting write sets inside database transactions:
//! - [`PostingRepository`] - posting runs and ad hoc invoice issuance
//! - [`ReconciliationRepository`] - payment recording, application, reversal
//! - [`LedgerRepository`] - balances, statements, aging, defaulters, metrics
//! - [`RoutingRepository`] - bank account chain resolution
//! - [`ReminderRepository`] - reminder rules, engine runs, dispatch logs

pub mod ledger;
pub mod posting;
pub mod reconciliation;
pub mod reminder;
pub mod routing;

mod ledger_writes;

pub use ledger::{CampusAging, LedgerRepository};
pub use posting::PostingRepository;
pub use reconciliation::{ReconciliationRepository, RecordPaymentInput};
pub use reminder::{
    CreateReminderRuleInput, ReminderRepository, ReminderStat, UpdateReminderRuleInput,
};
pub use routing::RoutingRepository;
