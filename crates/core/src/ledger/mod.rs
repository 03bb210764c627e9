//! Append-only double-entry student ledger.
//!
//! This module implements the ledger-side core logic:
//! - Ledger entries (debits and credits) and their references
//! - Materialized balance summary maintenance and rescan repair
//! - Statement generation with running balances
//! - Aging buckets and risk classification
//! - Defaulter detection, filtering, and sorting
//! - Collection rate metrics

pub mod aging;
pub mod balance;
pub mod defaulter;
pub mod error;
pub mod metrics;
pub mod statement;
pub mod types;

#[cfg(test)]
mod aging_props;
#[cfg(test)]
mod balance_props;

pub use aging::{AgingSnapshot, OutstandingInvoice, RiskLevel, age_invoices, assess_risk};
pub use balance::BalanceSummary;
pub use defaulter::{
    Defaulter, DefaulterCandidate, DefaulterPage, DefaulterQuery, DefaulterSort, OverdueBucket,
    SortOrder, find_defaulters,
};
pub use error::LedgerError;
pub use metrics::{CollectionMetrics, collection_rate};
pub use statement::{Statement, StatementLine, build_statement};
pub use types::{EntryDirection, EntryKind, LedgerEntry, LedgerEntrySeed, LedgerReference};
