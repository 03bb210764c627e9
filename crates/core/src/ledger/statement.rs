//! Statement generation with per-entry running balances.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::LedgerEntry;

/// One statement row: a ledger entry plus the balance after it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLine {
    /// The ledger entry.
    pub entry: LedgerEntry,
    /// Balance after this entry is applied.
    pub running_balance: Decimal,
}

/// A student statement over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    /// Net of all entries strictly before the range start.
    pub opening_balance: Decimal,
    /// Entries in the range, chronological, each with a running balance.
    pub lines: Vec<StatementLine>,
    /// Balance after the last entry (equals opening when the range is empty).
    pub closing_balance: Decimal,
}

/// Builds a statement from entries already sorted chronologically.
///
/// Debits add to the running balance, credits subtract. The opening balance
/// is computed by the caller (net of entries strictly before the range).
#[must_use]
pub fn build_statement(entries: Vec<LedgerEntry>, opening_balance: Decimal) -> Statement {
    let mut running = opening_balance;
    let lines = entries
        .into_iter()
        .map(|entry| {
            running += entry.signed_amount();
            StatementLine {
                entry,
                running_balance: running,
            }
        })
        .collect();

    Statement {
        opening_balance,
        lines,
        closing_balance: running,
    }
}
