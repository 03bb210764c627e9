//! Property tests for the balance summary projection.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tahsil_shared::types::{LedgerEntryId, OrganizationId, StudentId};

use super::balance::BalanceSummary;
use super::statement::build_statement;
use super::types::{EntryDirection, EntryKind, LedgerEntry, LedgerReference};

fn entry_strategy() -> impl Strategy<Value = LedgerEntry> {
    (1i64..10_000_000i64, prop::bool::ANY).prop_map(|(cents, is_debit)| {
        let direction = if is_debit {
            EntryDirection::Debit
        } else {
            EntryDirection::Credit
        };
        LedgerEntry {
            id: LedgerEntryId::new(),
            organization_id: OrganizationId::new(),
            student_id: StudentId::new(),
            direction,
            kind: if is_debit {
                EntryKind::InvoicePosted
            } else {
                EntryKind::PaymentReceived
            },
            amount: Decimal::new(cents, 2),
            reference: LedgerReference::None,
            entry_date: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            note: None,
        }
    })
}

fn entries_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerEntry>> {
    prop::collection::vec(entry_strategy(), 0..=max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any entry sequence, the summary invariant
    /// `balance = total_debit - total_credit` holds after every write.
    #[test]
    fn prop_summary_invariant_holds(entries in entries_strategy(50)) {
        let student_id = StudentId::new();
        let mut summary = BalanceSummary::empty(student_id);
        for entry in &entries {
            summary.apply(entry.direction, entry.amount);
            prop_assert_eq!(
                summary.balance,
                summary.total_debit - summary.total_credit
            );
        }
    }

    /// A full ledger rescan always reproduces the incrementally maintained
    /// summary. This is the correctness contract behind the repair operation.
    #[test]
    fn prop_rescan_equals_incremental(entries in entries_strategy(50)) {
        let student_id = StudentId::new();

        let mut incremental = BalanceSummary::empty(student_id);
        for entry in &entries {
            incremental.apply(entry.direction, entry.amount);
        }

        let rescanned = BalanceSummary::from_entries(student_id, entries.iter());
        prop_assert_eq!(incremental, rescanned);
    }

    /// The statement closing balance always equals the opening balance plus
    /// the net of signed entry amounts, regardless of entry order.
    #[test]
    fn prop_statement_closes_at_opening_plus_net(
        entries in entries_strategy(30),
        opening_cents in -1_000_000i64..1_000_000i64,
    ) {
        let opening = Decimal::new(opening_cents, 2);
        let net: Decimal = entries.iter().map(LedgerEntry::signed_amount).sum();

        let statement = build_statement(entries, opening);
        prop_assert_eq!(statement.closing_balance, opening + net);
    }

    /// Every statement line's running balance equals the previous line's
    /// balance plus the line's signed amount.
    #[test]
    fn prop_statement_lines_chain(entries in entries_strategy(30)) {
        let statement = build_statement(entries, Decimal::ZERO);
        let mut previous = statement.opening_balance;
        for line in &statement.lines {
            prop_assert_eq!(
                line.running_balance,
                previous + line.entry.signed_amount()
            );
            previous = line.running_balance;
        }
    }
}
