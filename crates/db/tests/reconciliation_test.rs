//! Integration tests for the reconciliation repository.
//!
//! Covers the partial-then-full payment lifecycle, duplicate submission
//! rejection, overpayment rejection, and reversal.

mod common;

use chrono::Utc;
use rust_decimal::Decimal;

use tahsil_core::reconciliation::{PaymentChannel, ReconciliationError};
use tahsil_db::entities::sea_orm_active_enums::{InvoiceStatus, PaymentStatus};
use tahsil_db::repositories::{
    LedgerRepository, PostingRepository, ReconciliationRepository, RecordPaymentInput,
};
use tahsil_shared::types::{BillingPeriod, InvoiceId, PaymentRecordId};

fn period() -> BillingPeriod {
    BillingPeriod::new(2026, 9).expect("valid period")
}

fn payment(invoice_id: InvoiceId, amount: Decimal, reference: &str) -> RecordPaymentInput {
    RecordPaymentInput {
        invoice_id,
        amount,
        channel: PaymentChannel::BankTransfer,
        paid_at: Utc::now(),
        transaction_ref: Some(reference.to_string()),
        bank_account_id: None,
    }
}

// ============================================================================
// Test: Partial payment, then settlement
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_partial_then_full_payment() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let posting = PostingRepository::new(db.clone(), &common::finance());
    let invoice = posting
        .issue_invoice(&fx.scope, fx.student_id, fx.rule_id, period(), None)
        .await
        .expect("invoice");
    let invoice_id = InvoiceId::from_uuid(invoice.id);

    let repo = ReconciliationRepository::new(db.clone(), &common::finance());

    let (partial, pay1) = repo
        .record_and_reconcile(&fx.scope, payment(invoice_id, Decimal::new(500, 0), "TXN-1"))
        .await
        .expect("partial payment");
    assert_eq!(partial.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(partial.paid_amount, Decimal::new(500, 0));
    assert!(partial.paid_at.is_none());
    assert_eq!(pay1.status, PaymentStatus::Reconciled);

    let (settled, _) = repo
        .record_and_reconcile(&fx.scope, payment(invoice_id, Decimal::new(1000, 0), "TXN-2"))
        .await
        .expect("settling payment");
    assert_eq!(settled.status, InvoiceStatus::Paid);
    assert_eq!(settled.paid_amount, Decimal::new(1500, 0));
    assert!(settled.paid_at.is_some());

    // Two credits against one debit: the student owes nothing.
    let summary = LedgerRepository::new(db.clone())
        .get_summary(&fx.scope, fx.student_id)
        .await
        .expect("summary");
    assert_eq!(summary.balance, Decimal::ZERO);
    assert_eq!(summary.total_debit, Decimal::new(1500, 0));
    assert_eq!(summary.total_credit, Decimal::new(1500, 0));

    // A settled invoice accepts nothing further.
    let err = repo
        .record_and_reconcile(&fx.scope, payment(invoice_id, Decimal::new(100, 0), "TXN-3"))
        .await
        .expect_err("settled invoice rejects payment");
    assert!(matches!(err, ReconciliationError::AlreadySettled(_)));
}

// ============================================================================
// Test: A duplicate submission is rejected atomically
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_submission_rejected() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let posting = PostingRepository::new(db.clone(), &common::finance());
    let invoice = posting
        .issue_invoice(&fx.scope, fx.student_id, fx.rule_id, period(), None)
        .await
        .expect("invoice");
    let invoice_id = InvoiceId::from_uuid(invoice.id);

    let repo = ReconciliationRepository::new(db.clone(), &common::finance());
    let input = payment(invoice_id, Decimal::new(1500, 0), "TXN-DUP");

    repo.record_payment(&fx.scope, input.clone())
        .await
        .expect("first submission");
    let err = repo
        .record_payment(&fx.scope, input)
        .await
        .expect_err("identical submission must be rejected");
    assert!(matches!(err, ReconciliationError::DuplicatePayment));

    // A different transaction reference is a different payment.
    repo.record_payment(&fx.scope, payment(invoice_id, Decimal::new(1500, 0), "TXN-OTHER"))
        .await
        .expect("distinct reference is accepted");
}

// ============================================================================
// Test: Overpayment is rejected at application time
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_overpayment_rejected() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let posting = PostingRepository::new(db.clone(), &common::finance());
    let invoice = posting
        .issue_invoice(&fx.scope, fx.student_id, fx.rule_id, period(), None)
        .await
        .expect("invoice");
    let invoice_id = InvoiceId::from_uuid(invoice.id);

    let repo = ReconciliationRepository::new(db.clone(), &common::finance());
    let err = repo
        .record_and_reconcile(&fx.scope, payment(invoice_id, Decimal::new(2000, 0), "TXN-BIG"))
        .await
        .expect_err("overpayment must be rejected");
    assert!(matches!(err, ReconciliationError::Overpayment { .. }));

    // The invoice and ledger are untouched; only the pending record exists.
    let summary = LedgerRepository::new(db.clone())
        .get_summary(&fx.scope, fx.student_id)
        .await
        .expect("summary");
    assert_eq!(summary.balance, Decimal::new(1500, 0));
}

// ============================================================================
// Test: Reversal restores the invoice and appends a refund debit
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_reversal_restores_invoice() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let posting = PostingRepository::new(db.clone(), &common::finance());
    let invoice = posting
        .issue_invoice(&fx.scope, fx.student_id, fx.rule_id, period(), None)
        .await
        .expect("invoice");
    let invoice_id = InvoiceId::from_uuid(invoice.id);

    let repo = ReconciliationRepository::new(db.clone(), &common::finance());
    let (_, paid) = repo
        .record_and_reconcile(&fx.scope, payment(invoice_id, Decimal::new(1500, 0), "TXN-RV"))
        .await
        .expect("payment");

    let (restored, refunded) = repo
        .reverse_payment(
            &fx.scope,
            PaymentRecordId::from_uuid(paid.id),
            "bounced cheque",
        )
        .await
        .expect("reversal");

    assert_eq!(restored.status, InvoiceStatus::Unpaid);
    assert_eq!(restored.paid_amount, Decimal::ZERO);
    assert!(restored.paid_at.is_none());
    assert_eq!(refunded.status, PaymentStatus::Refunded);
    assert_eq!(refunded.failure_reason.as_deref(), Some("bounced cheque"));

    // Debit 1500, credit 1500, refund debit 1500: the balance is owed again.
    let summary = LedgerRepository::new(db.clone())
        .get_summary(&fx.scope, fx.student_id)
        .await
        .expect("summary");
    assert_eq!(summary.balance, Decimal::new(1500, 0));
    assert_eq!(summary.total_debit, Decimal::new(3000, 0));
}

// ============================================================================
// Test: A failed payment is terminal
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_payment_cannot_be_reconciled() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let posting = PostingRepository::new(db.clone(), &common::finance());
    let invoice = posting
        .issue_invoice(&fx.scope, fx.student_id, fx.rule_id, period(), None)
        .await
        .expect("invoice");
    let invoice_id = InvoiceId::from_uuid(invoice.id);

    let repo = ReconciliationRepository::new(db.clone(), &common::finance());
    let pending = repo
        .record_payment(&fx.scope, payment(invoice_id, Decimal::new(1500, 0), "TXN-F"))
        .await
        .expect("record");
    let payment_id = PaymentRecordId::from_uuid(pending.id);

    let failed = repo
        .mark_payment_failed(&fx.scope, payment_id, "gateway timeout")
        .await
        .expect("mark failed");
    assert_eq!(failed.status, PaymentStatus::Failed);

    let err = repo
        .reconcile_payment(&fx.scope, payment_id)
        .await
        .expect_err("failed payment is terminal");
    assert!(matches!(err, ReconciliationError::InvalidPaymentState { .. }));
}
