//! Challan (invoice) lifecycle and status rules.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{
    BankAccountId, BillingPeriod, BillingRuleId, CampusId, InvoiceId, OrganizationId, StudentId,
};

/// Invoice (challan) status.
///
/// Transitions are forward-only except through explicit payment reversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// No payment applied yet.
    Unpaid,
    /// Partially covered: `0 < paid_amount < total_amount`.
    PartiallyPaid,
    /// Fully covered: `paid_amount >= total_amount`.
    Paid,
    /// Voided; never participates in aging, payments, or reminders.
    Cancelled,
}

impl InvoiceStatus {
    /// Computes the status implied by the amounts on an invoice.
    ///
    /// Never returns [`Self::Cancelled`]; cancellation is an explicit act,
    /// not a function of the amounts.
    #[must_use]
    pub fn for_amounts(total_amount: Decimal, paid_amount: Decimal) -> Self {
        if paid_amount <= Decimal::ZERO {
            Self::Unpaid
        } else if paid_amount < total_amount {
            Self::PartiallyPaid
        } else {
            Self::Paid
        }
    }
}

/// An invoice (challan) issued against a student for one billing period.
///
/// Invariant: `0 <= paid_amount <= total_amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Campus the student belongs to.
    pub campus_id: CampusId,
    /// Billed student.
    pub student_id: StudentId,
    /// Human-readable invoice number.
    pub invoice_no: String,
    /// Payment deadline.
    pub due_date: NaiveDate,
    /// Amount billed.
    pub total_amount: Decimal,
    /// Amount applied so far.
    pub paid_amount: Decimal,
    /// Current status.
    pub status: InvoiceStatus,
    /// Billing period the invoice covers.
    pub period: BillingPeriod,
    /// Billing rule that produced the invoice.
    pub billing_rule_id: BillingRuleId,
    /// Bank account the invoice is attributed to, if routing resolved one.
    pub bank_account_id: Option<BankAccountId>,
    /// When the invoice transitioned to Paid, if it did.
    pub paid_at: Option<DateTime<Utc>>,
}

impl Invoice {
    /// Remaining amount owed on the invoice.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }

    /// Whether payments may still be applied.
    #[must_use]
    pub fn is_payable(&self) -> bool {
        self.status != InvoiceStatus::Cancelled && self.outstanding() > Decimal::ZERO
    }

    /// Days past due as of `today`. Negative means not yet due.
    #[must_use]
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.due_date).num_days()
    }
}

/// Builds the deterministic invoice number for a (period, student, rule) triple.
///
/// Format: `FP-YYYYMM-<student id>-<rule id>` with the full ids in simple hex.
/// The ids are time-ordered uuids whose leading bits are a timestamp, so any
/// truncation would collide for students created close together; the full ids
/// keep the number unique per (student, rule) within a period.
#[must_use]
pub fn invoice_number(
    period: BillingPeriod,
    student_id: StudentId,
    billing_rule_id: BillingRuleId,
) -> String {
    format!(
        "FP-{}{:02}-{}-{}",
        period.year,
        period.month,
        student_id.into_inner().simple(),
        billing_rule_id.into_inner().simple(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn invoice(total: Decimal, paid: Decimal) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            organization_id: OrganizationId::new(),
            campus_id: CampusId::new(),
            student_id: StudentId::new(),
            invoice_no: "FP-202608-test".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            total_amount: total,
            paid_amount: paid,
            status: InvoiceStatus::for_amounts(total, paid),
            period: BillingPeriod::new(2026, 8).unwrap(),
            billing_rule_id: BillingRuleId::new(),
            bank_account_id: None,
            paid_at: None,
        }
    }

    #[test]
    fn test_status_for_amounts() {
        assert_eq!(
            InvoiceStatus::for_amounts(dec!(5000), dec!(0)),
            InvoiceStatus::Unpaid
        );
        assert_eq!(
            InvoiceStatus::for_amounts(dec!(5000), dec!(2000)),
            InvoiceStatus::PartiallyPaid
        );
        assert_eq!(
            InvoiceStatus::for_amounts(dec!(5000), dec!(5000)),
            InvoiceStatus::Paid
        );
        assert_eq!(
            InvoiceStatus::for_amounts(dec!(5000), dec!(6000)),
            InvoiceStatus::Paid
        );
    }

    #[test]
    fn test_outstanding_floors_at_zero() {
        assert_eq!(invoice(dec!(5000), dec!(2000)).outstanding(), dec!(3000));
        assert_eq!(invoice(dec!(5000), dec!(6000)).outstanding(), dec!(0));
    }

    #[test]
    fn test_cancelled_is_not_payable() {
        let mut inv = invoice(dec!(5000), dec!(0));
        inv.status = InvoiceStatus::Cancelled;
        assert!(!inv.is_payable());
    }

    #[test]
    fn test_days_overdue_sign() {
        let inv = invoice(dec!(5000), dec!(0));
        let before = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let after = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(inv.days_overdue(before), -5);
        assert_eq!(inv.days_overdue(after), 15);
    }

    #[test]
    fn test_invoice_number_format() {
        let student =
            StudentId::from_str("0198c6a0-0000-7000-8000-000000000001").unwrap();
        let rule = BillingRuleId::from_str("0198c6a0-ffff-7000-8000-000000000002").unwrap();
        let period = BillingPeriod::new(2026, 3).unwrap();
        assert_eq!(
            invoice_number(period, student, rule),
            "FP-202603-0198c6a0000070008000000000000001-0198c6a0ffff70008000000000000002"
        );
    }

    #[test]
    fn test_invoice_numbers_distinct_for_students_sharing_timestamp_prefix() {
        // Time-ordered ids minted in the same millisecond differ only in
        // their trailing random bits.
        let first =
            StudentId::from_str("0198c6a0-0000-7000-8000-000000000001").unwrap();
        let second =
            StudentId::from_str("0198c6a0-0000-7000-8000-000000000002").unwrap();
        let rule = BillingRuleId::new();
        let period = BillingPeriod::new(2026, 3).unwrap();
        assert_ne!(
            invoice_number(period, first, rule),
            invoice_number(period, second, rule)
        );
    }
}
