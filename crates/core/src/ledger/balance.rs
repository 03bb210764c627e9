//! Materialized balance summary maintenance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::StudentId;

use super::types::{EntryDirection, LedgerEntry};

/// Materialized per-student balance projection.
///
/// Maintained in the same transaction as every ledger write so balance reads
/// are O(1). Invariant: `balance = total_debit - total_credit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSummary {
    /// The student this summary belongs to.
    pub student_id: StudentId,
    /// Sum of all debit entries.
    pub total_debit: Decimal,
    /// Sum of all credit entries.
    pub total_credit: Decimal,
    /// Net amount owed. Positive means the student owes money.
    pub balance: Decimal,
}

impl BalanceSummary {
    /// Creates an empty summary for a student.
    #[must_use]
    pub fn empty(student_id: StudentId) -> Self {
        Self {
            student_id,
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    /// Applies one ledger write to the summary.
    pub fn apply(&mut self, direction: EntryDirection, amount: Decimal) {
        match direction {
            EntryDirection::Debit => self.total_debit += amount,
            EntryDirection::Credit => self.total_credit += amount,
        }
        self.balance = self.total_debit - self.total_credit;
    }

    /// Rebuilds the summary from a full ledger rescan.
    ///
    /// Used by the repair operation to correct drift between the projection
    /// and the append-only ledger.
    #[must_use]
    pub fn from_entries<'a, I>(student_id: StudentId, entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        let mut summary = Self::empty(student_id);
        for entry in entries {
            summary.apply(entry.direction, entry.amount);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_apply_maintains_invariant() {
        let mut summary = BalanceSummary::empty(StudentId::new());
        summary.apply(EntryDirection::Debit, dec!(5000));
        assert_eq!(summary.balance, dec!(5000));

        summary.apply(EntryDirection::Credit, dec!(2000));
        assert_eq!(summary.total_debit, dec!(5000));
        assert_eq!(summary.total_credit, dec!(2000));
        assert_eq!(summary.balance, dec!(3000));
    }

    #[test]
    fn test_credit_can_drive_balance_negative() {
        // Overpayment is rejected upstream, but a refund-then-repost sequence
        // can transiently leave a credit surplus; the projection must carry it.
        let mut summary = BalanceSummary::empty(StudentId::new());
        summary.apply(EntryDirection::Credit, dec!(100));
        assert_eq!(summary.balance, dec!(-100));
    }
}
