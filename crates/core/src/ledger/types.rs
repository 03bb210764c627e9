//! Ledger entry domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{
    InvoiceId, LedgerEntryId, OrganizationId, PaymentRecordId, StudentId,
};

/// Direction of a ledger entry.
///
/// A Debit increases what the student owes; a Credit decreases it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryDirection {
    /// Increases the student's balance (amount owed).
    Debit,
    /// Decreases the student's balance.
    Credit,
}

impl EntryDirection {
    /// Signed contribution of an amount in this direction.
    #[must_use]
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => amount,
            Self::Credit => -amount,
        }
    }
}

/// Business meaning of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Debit written when an invoice is posted.
    InvoicePosted,
    /// Credit written when a payment is applied.
    PaymentReceived,
    /// Debit written when a reconciled payment is reversed.
    Refund,
    /// Manual correction entry.
    Adjustment,
}

/// What a ledger entry refers to.
///
/// The reference is a tagged union rather than a pair of nullable foreign
/// keys, so an entry can never ambiguously point at both an invoice and a
/// payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerReference {
    /// The entry was produced by posting this invoice.
    Invoice(InvoiceId),
    /// The entry was produced by applying or reversing this payment.
    Payment(PaymentRecordId),
    /// Free-standing entry (e.g. a manual adjustment).
    None,
}

/// One immutable row in a student's ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Entry ID.
    pub id: LedgerEntryId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Student whose ledger this entry belongs to.
    pub student_id: StudentId,
    /// Debit or credit.
    pub direction: EntryDirection,
    /// Business meaning.
    pub kind: EntryKind,
    /// Positive amount.
    pub amount: Decimal,
    /// What the entry refers to.
    pub reference: LedgerReference,
    /// When the entry takes effect.
    pub entry_date: DateTime<Utc>,
    /// Optional free-text note (e.g. reversal reason).
    pub note: Option<String>,
}

impl LedgerEntry {
    /// Signed amount of this entry (Debit positive, Credit negative).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.direction.signed(self.amount)
    }
}

/// A planned ledger entry, produced by core planning and persisted by the
/// repository inside the same transaction as the rest of the unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntrySeed {
    /// Student whose ledger receives the entry.
    pub student_id: StudentId,
    /// Debit or credit.
    pub direction: EntryDirection,
    /// Business meaning.
    pub kind: EntryKind,
    /// Positive amount.
    pub amount: Decimal,
    /// What the entry refers to.
    pub reference: LedgerReference,
    /// Optional free-text note.
    pub note: Option<String>,
}
