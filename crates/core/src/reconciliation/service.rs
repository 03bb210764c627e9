//! Payment application and reversal planning.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::OrganizationId;

use crate::invoice::{Invoice, InvoiceStatus};
use crate::ledger::{EntryDirection, EntryKind, LedgerEntrySeed, LedgerReference};

use super::error::ReconciliationError;
use super::types::{PaymentRecord, PaymentStatus};

/// The writes one payment application implies.
///
/// The repository executes all of them in a single transaction: invoice
/// update, payment status, ledger entry, summary credit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationPlan {
    /// Invoice `paid_amount` after the payment.
    pub new_paid_amount: Decimal,
    /// Invoice status after the payment.
    pub new_status: InvoiceStatus,
    /// Whether this application transitions the invoice to Paid, which is
    /// the only moment `paid_at` is stamped.
    pub stamp_paid_at: bool,
    /// The Credit ledger entry to append.
    pub ledger_seed: LedgerEntrySeed,
}

/// The writes one payment reversal implies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReversalPlan {
    /// Invoice `paid_amount` after the reversal, floored at zero.
    pub new_paid_amount: Decimal,
    /// Invoice status after the reversal.
    pub new_status: InvoiceStatus,
    /// The Debit refund ledger entry to append.
    pub ledger_seed: LedgerEntrySeed,
}

/// Pure reconciliation planning.
pub struct ReconciliationService;

impl ReconciliationService {
    /// Validates and plans applying `payment` to `invoice`.
    ///
    /// Overpayment is rejected: the engine never splits a payment across
    /// invoices, so the caller must pick an invoice whose outstanding covers
    /// the amount.
    ///
    /// # Errors
    ///
    /// Returns a [`ReconciliationError`] when the invoice belongs to another
    /// organization, is cancelled or settled, or the amount is non-positive
    /// or exceeds the outstanding.
    pub fn plan_application(
        organization_id: OrganizationId,
        invoice: &Invoice,
        payment: &PaymentRecord,
    ) -> Result<ApplicationPlan, ReconciliationError> {
        let invoice_uuid = invoice.id.into_inner();

        if invoice.organization_id != organization_id
            || payment.organization_id != organization_id
        {
            return Err(ReconciliationError::WrongOrganization(invoice_uuid));
        }
        if invoice.status == InvoiceStatus::Cancelled {
            return Err(ReconciliationError::InvoiceCancelled(invoice_uuid));
        }
        if payment.status != PaymentStatus::Pending {
            return Err(ReconciliationError::InvalidPaymentState {
                id: payment.id.into_inner(),
                status: format!("{:?}", payment.status),
                expected: format!("{:?}", PaymentStatus::Pending),
            });
        }
        if payment.amount <= Decimal::ZERO {
            return Err(ReconciliationError::NonPositiveAmount);
        }

        let outstanding = invoice.outstanding();
        if outstanding <= Decimal::ZERO {
            return Err(ReconciliationError::AlreadySettled(invoice_uuid));
        }
        if payment.amount > outstanding {
            return Err(ReconciliationError::Overpayment {
                amount: payment.amount,
                outstanding,
            });
        }

        let new_paid_amount = invoice.paid_amount + payment.amount;
        let new_status = InvoiceStatus::for_amounts(invoice.total_amount, new_paid_amount);

        Ok(ApplicationPlan {
            new_paid_amount,
            new_status,
            stamp_paid_at: new_status == InvoiceStatus::Paid
                && invoice.status != InvoiceStatus::Paid,
            ledger_seed: LedgerEntrySeed {
                student_id: invoice.student_id,
                direction: EntryDirection::Credit,
                kind: EntryKind::PaymentReceived,
                amount: payment.amount,
                reference: LedgerReference::Payment(payment.id),
                note: None,
            },
        })
    }

    /// Validates and plans reversing a reconciled payment.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::InvalidPaymentState`] unless the
    /// payment is Reconciled against this invoice.
    pub fn plan_reversal(
        organization_id: OrganizationId,
        invoice: &Invoice,
        payment: &PaymentRecord,
        reason: &str,
    ) -> Result<ReversalPlan, ReconciliationError> {
        let invoice_uuid = invoice.id.into_inner();

        if invoice.organization_id != organization_id
            || payment.organization_id != organization_id
        {
            return Err(ReconciliationError::WrongOrganization(invoice_uuid));
        }
        if payment.status != PaymentStatus::Reconciled
            || payment.invoice_id != Some(invoice.id)
        {
            return Err(ReconciliationError::InvalidPaymentState {
                id: payment.id.into_inner(),
                status: format!("{:?}", payment.status),
                expected: format!("{:?}", PaymentStatus::Reconciled),
            });
        }

        let new_paid_amount = (invoice.paid_amount - payment.amount).max(Decimal::ZERO);
        let new_status = if new_paid_amount == Decimal::ZERO {
            InvoiceStatus::Unpaid
        } else {
            InvoiceStatus::PartiallyPaid
        };

        Ok(ReversalPlan {
            new_paid_amount,
            new_status,
            ledger_seed: LedgerEntrySeed {
                student_id: invoice.student_id,
                direction: EntryDirection::Debit,
                kind: EntryKind::Refund,
                amount: payment.amount,
                reference: LedgerReference::Payment(payment.id),
                note: Some(reason.to_string()),
            },
        })
    }

    /// Validates the Pending to Failed transition.
    ///
    /// A Pending payment may only fail; a failed payment never becomes
    /// Reconciled afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::InvalidPaymentState`] when the payment
    /// is not Pending.
    pub fn plan_failure(payment: &PaymentRecord) -> Result<(), ReconciliationError> {
        if payment.status != PaymentStatus::Pending {
            return Err(ReconciliationError::InvalidPaymentState {
                id: payment.id.into_inner(),
                status: format!("{:?}", payment.status),
                expected: format!("{:?}", PaymentStatus::Pending),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use tahsil_shared::types::{
        BillingPeriod, BillingRuleId, CampusId, InvoiceId, PaymentRecordId, StudentId,
    };

    use crate::reconciliation::types::PaymentChannel;

    fn invoice(org: OrganizationId, total: Decimal, paid: Decimal) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            organization_id: org,
            campus_id: CampusId::new(),
            student_id: StudentId::new(),
            invoice_no: "FP-202608-aaaaaaaa-bbbbbbbb".to_string(),
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

    fn payment(org: OrganizationId, amount: Decimal, status: PaymentStatus) -> PaymentRecord {
        PaymentRecord {
            id: PaymentRecordId::new(),
            organization_id: org,
            invoice_id: None,
            bank_account_id: None,
            amount,
            currency: "PKR".to_string(),
            channel: PaymentChannel::Cash,
            status,
            transaction_ref: None,
            idempotency_key: None,
            paid_at: Utc::now(),
            failure_reason: None,
        }
    }

    #[test]
    fn test_partial_application() {
        let org = OrganizationId::new();
        let inv = invoice(org, dec!(5000), dec!(0));
        let pay = payment(org, dec!(2000), PaymentStatus::Pending);

        let plan = ReconciliationService::plan_application(org, &inv, &pay).unwrap();
        assert_eq!(plan.new_paid_amount, dec!(2000));
        assert_eq!(plan.new_status, InvoiceStatus::PartiallyPaid);
        assert!(!plan.stamp_paid_at);
        assert_eq!(plan.ledger_seed.direction, EntryDirection::Credit);
        assert_eq!(plan.ledger_seed.amount, dec!(2000));
        assert_eq!(
            plan.ledger_seed.reference,
            LedgerReference::Payment(pay.id)
        );
    }

    #[test]
    fn test_settling_application_stamps_paid_at() {
        let org = OrganizationId::new();
        let inv = invoice(org, dec!(5000), dec!(3000));
        let pay = payment(org, dec!(2000), PaymentStatus::Pending);

        let plan = ReconciliationService::plan_application(org, &inv, &pay).unwrap();
        assert_eq!(plan.new_status, InvoiceStatus::Paid);
        assert!(plan.stamp_paid_at);
    }

    #[test]
    fn test_overpayment_is_rejected() {
        let org = OrganizationId::new();
        let inv = invoice(org, dec!(5000), dec!(4000));
        let pay = payment(org, dec!(2000), PaymentStatus::Pending);

        let err = ReconciliationService::plan_application(org, &inv, &pay).unwrap_err();
        assert!(matches!(
            err,
            ReconciliationError::Overpayment {
                amount,
                outstanding,
            } if amount == dec!(2000) && outstanding == dec!(1000)
        ));
    }

    #[test]
    fn test_settled_invoice_rejects_payment() {
        let org = OrganizationId::new();
        let inv = invoice(org, dec!(5000), dec!(5000));
        let pay = payment(org, dec!(100), PaymentStatus::Pending);

        let err = ReconciliationService::plan_application(org, &inv, &pay).unwrap_err();
        assert!(matches!(err, ReconciliationError::AlreadySettled(_)));
    }

    #[test]
    fn test_cancelled_invoice_rejects_payment() {
        let org = OrganizationId::new();
        let mut inv = invoice(org, dec!(5000), dec!(0));
        inv.status = InvoiceStatus::Cancelled;
        let pay = payment(org, dec!(100), PaymentStatus::Pending);

        let err = ReconciliationService::plan_application(org, &inv, &pay).unwrap_err();
        assert!(matches!(err, ReconciliationError::InvoiceCancelled(_)));
    }

    #[test]
    fn test_wrong_organization_is_rejected() {
        let org = OrganizationId::new();
        let inv = invoice(OrganizationId::new(), dec!(5000), dec!(0));
        let pay = payment(org, dec!(100), PaymentStatus::Pending);

        let err = ReconciliationService::plan_application(org, &inv, &pay).unwrap_err();
        assert!(matches!(err, ReconciliationError::WrongOrganization(_)));
    }

    #[test]
    fn test_non_positive_amount_is_rejected() {
        let org = OrganizationId::new();
        let inv = invoice(org, dec!(5000), dec!(0));
        let pay = payment(org, dec!(0), PaymentStatus::Pending);

        let err = ReconciliationService::plan_application(org, &inv, &pay).unwrap_err();
        assert!(matches!(err, ReconciliationError::NonPositiveAmount));
    }

    #[test]
    fn test_reversal_restores_partial_state() {
        let org = OrganizationId::new();
        let inv = invoice(org, dec!(5000), dec!(5000));
        let mut pay = payment(org, dec!(2000), PaymentStatus::Reconciled);
        pay.invoice_id = Some(inv.id);

        let plan =
            ReconciliationService::plan_reversal(org, &inv, &pay, "entry error").unwrap();
        assert_eq!(plan.new_paid_amount, dec!(3000));
        assert_eq!(plan.new_status, InvoiceStatus::PartiallyPaid);
        assert_eq!(plan.ledger_seed.direction, EntryDirection::Debit);
        assert_eq!(plan.ledger_seed.kind, EntryKind::Refund);
        assert_eq!(plan.ledger_seed.note.as_deref(), Some("entry error"));
    }

    #[test]
    fn test_full_reversal_floors_at_zero() {
        let org = OrganizationId::new();
        let inv = invoice(org, dec!(5000), dec!(2000));
        let mut pay = payment(org, dec!(2000), PaymentStatus::Reconciled);
        pay.invoice_id = Some(inv.id);

        let plan = ReconciliationService::plan_reversal(org, &inv, &pay, "bounced").unwrap();
        assert_eq!(plan.new_paid_amount, dec!(0));
        assert_eq!(plan.new_status, InvoiceStatus::Unpaid);
    }

    #[test]
    fn test_only_reconciled_payments_reverse() {
        let org = OrganizationId::new();
        let inv = invoice(org, dec!(5000), dec!(2000));
        let pay = payment(org, dec!(2000), PaymentStatus::Pending);

        let err =
            ReconciliationService::plan_reversal(org, &inv, &pay, "reason").unwrap_err();
        assert!(matches!(
            err,
            ReconciliationError::InvalidPaymentState { .. }
        ));
    }

    #[test]
    fn test_pending_is_the_only_failure_source() {
        let org = OrganizationId::new();
        assert!(
            ReconciliationService::plan_failure(&payment(org, dec!(1), PaymentStatus::Pending))
                .is_ok()
        );
        assert!(ReconciliationService::plan_failure(&payment(
            org,
            dec!(1),
            PaymentStatus::Failed
        ))
        .is_err());
        assert!(ReconciliationService::plan_failure(&payment(
            org,
            dec!(1),
            PaymentStatus::Reconciled
        ))
        .is_err());
    }
}
