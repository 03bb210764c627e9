//! Reconciliation repository: records payments and applies them to invoices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use tahsil_core::reconciliation::{
    manual_payment_key, PaymentChannel, ReconciliationError, ReconciliationService,
};
use tahsil_shared::config::FinanceConfig;
use tahsil_shared::scope::FinanceScope;
use tahsil_shared::types::{BankAccountId, InvoiceId, PaymentRecordId, StudentId};

use crate::entities::{
    invoices, payment_records,
    sea_orm_active_enums::{InvoiceStatus, PaymentStatus},
};

use super::ledger_writes;

fn db_err(err: DbErr) -> ReconciliationError {
    ReconciliationError::Database(err.to_string())
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Invoice the payment targets.
    pub invoice_id: InvoiceId,
    /// Paid amount.
    pub amount: Decimal,
    /// Collection channel.
    pub channel: PaymentChannel,
    /// When the money changed hands.
    pub paid_at: DateTime<Utc>,
    /// External transaction reference, when the channel provides one.
    pub transaction_ref: Option<String>,
    /// Receiving bank account, when known.
    pub bank_account_id: Option<BankAccountId>,
}

/// Repository for payment recording and reconciliation.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
    default_currency: String,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, finance: &FinanceConfig) -> Self {
        Self {
            db,
            default_currency: finance.default_currency.clone(),
        }
    }

    /// Records a pending payment against an invoice.
    ///
    /// The deterministic idempotency key is computed from the submission's
    /// identifying fields; the partial unique index on it makes a duplicate
    /// submission fail atomically even under concurrency.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::DuplicatePayment`] for a repeated
    /// submission and [`ReconciliationError::InvoiceNotFound`] when the
    /// invoice is not in this organization.
    pub async fn record_payment(
        &self,
        scope: &FinanceScope,
        input: RecordPaymentInput,
    ) -> Result<payment_records::Model, ReconciliationError> {
        let org_uuid = scope.organization_id.into_inner();

        // The invoice must exist in-scope before a payment may reference it.
        invoices::Entity::find_by_id(input.invoice_id.into_inner())
            .filter(invoices::Column::OrganizationId.eq(org_uuid))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ReconciliationError::InvoiceNotFound(
                input.invoice_id.into_inner(),
            ))?;

        let key = manual_payment_key(
            scope.organization_id,
            input.invoice_id,
            input.amount,
            input.paid_at.date_naive(),
            input.channel,
            input.transaction_ref.as_deref(),
        );

        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let result = payment_records::ActiveModel {
            id: Set(PaymentRecordId::new().into_inner()),
            organization_id: Set(org_uuid),
            invoice_id: Set(Some(input.invoice_id.into_inner())),
            bank_account_id: Set(input.bank_account_id.map(BankAccountId::into_inner)),
            amount: Set(input.amount),
            currency: Set(self.default_currency.clone()),
            channel: Set(input.channel.into()),
            status: Set(PaymentStatus::Pending),
            transaction_ref: Set(input.transaction_ref),
            idempotency_key: Set(Some(key)),
            paid_at: Set(input.paid_at.into()),
            failure_reason: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await;

        result.map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                ReconciliationError::DuplicatePayment
            } else {
                db_err(err)
            }
        })
    }

    /// Applies a pending payment to its invoice.
    ///
    /// Invoice update, payment status, ledger credit, and summary projection
    /// commit in one transaction.
    ///
    /// # Errors
    ///
    /// Returns the core validation errors (overpayment, settled or cancelled
    /// invoice, wrong state) unchanged.
    pub async fn reconcile_payment(
        &self,
        scope: &FinanceScope,
        payment_id: PaymentRecordId,
    ) -> Result<(invoices::Model, payment_records::Model), ReconciliationError> {
        let (invoice_row, payment_row) = self.load_pair(scope, payment_id).await?;

        let invoice = tahsil_core::invoice::Invoice::from(invoice_row.clone());
        let payment = tahsil_core::reconciliation::PaymentRecord::from(payment_row.clone());
        let plan =
            ReconciliationService::plan_application(scope.organization_id, &invoice, &payment)?;

        let now = Utc::now();
        let now_tz: sea_orm::prelude::DateTimeWithTimeZone = now.into();
        let txn = self.db.begin().await.map_err(db_err)?;

        let mut invoice_active: invoices::ActiveModel = invoice_row.into();
        invoice_active.paid_amount = Set(plan.new_paid_amount);
        invoice_active.status = Set(plan.new_status.into());
        if plan.stamp_paid_at {
            invoice_active.paid_at = Set(Some(payment.paid_at.into()));
        }
        invoice_active.updated_at = Set(now_tz);
        let updated_invoice = invoice_active.update(&txn).await.map_err(db_err)?;

        let mut payment_active: payment_records::ActiveModel = payment_row.into();
        payment_active.status = Set(PaymentStatus::Reconciled);
        payment_active.updated_at = Set(now_tz);
        let updated_payment = payment_active.update(&txn).await.map_err(db_err)?;

        ledger_writes::append_entry(
            &txn,
            scope.organization_id.into_inner(),
            &plan.ledger_seed,
            payment.paid_at,
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(
            payment_id = %payment_id,
            invoice_id = %updated_invoice.id,
            amount = %payment.amount,
            "payment reconciled"
        );
        Ok((updated_invoice, updated_payment))
    }

    /// Records a manual payment and applies it in one call.
    ///
    /// This is the over-the-counter entry path: the clerk submits once and
    /// the invoice reflects the payment immediately.
    ///
    /// # Errors
    ///
    /// Returns the recording and application errors of the two steps.
    pub async fn record_and_reconcile(
        &self,
        scope: &FinanceScope,
        input: RecordPaymentInput,
    ) -> Result<(invoices::Model, payment_records::Model), ReconciliationError> {
        let payment = self.record_payment(scope, input).await?;
        self.reconcile_payment(scope, PaymentRecordId::from_uuid(payment.id))
            .await
    }

    /// Reverses a reconciled payment, restoring the invoice and appending a
    /// debit refund entry.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::InvalidPaymentState`] unless the
    /// payment is reconciled against this invoice.
    pub async fn reverse_payment(
        &self,
        scope: &FinanceScope,
        payment_id: PaymentRecordId,
        reason: &str,
    ) -> Result<(invoices::Model, payment_records::Model), ReconciliationError> {
        let (invoice_row, payment_row) = self.load_pair(scope, payment_id).await?;

        let invoice = tahsil_core::invoice::Invoice::from(invoice_row.clone());
        let payment = tahsil_core::reconciliation::PaymentRecord::from(payment_row.clone());
        let plan = ReconciliationService::plan_reversal(
            scope.organization_id,
            &invoice,
            &payment,
            reason,
        )?;

        let now = Utc::now();
        let now_tz: sea_orm::prelude::DateTimeWithTimeZone = now.into();
        let txn = self.db.begin().await.map_err(db_err)?;

        let mut invoice_active: invoices::ActiveModel = invoice_row.into();
        invoice_active.paid_amount = Set(plan.new_paid_amount);
        invoice_active.status = Set(plan.new_status.into());
        invoice_active.paid_at = Set(None);
        invoice_active.updated_at = Set(now_tz);
        let updated_invoice = invoice_active.update(&txn).await.map_err(db_err)?;

        let mut payment_active: payment_records::ActiveModel = payment_row.into();
        payment_active.status = Set(PaymentStatus::Refunded);
        payment_active.failure_reason = Set(Some(reason.to_string()));
        payment_active.updated_at = Set(now_tz);
        let updated_payment = payment_active.update(&txn).await.map_err(db_err)?;

        ledger_writes::append_entry(
            &txn,
            scope.organization_id.into_inner(),
            &plan.ledger_seed,
            now,
        )
        .await
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::info!(payment_id = %payment_id, reason, "payment reversed");
        Ok((updated_invoice, updated_payment))
    }

    /// Marks a pending payment as failed.
    ///
    /// A failed payment is terminal; it can never be reconciled afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::InvalidPaymentState`] when the payment
    /// is not pending.
    pub async fn mark_payment_failed(
        &self,
        scope: &FinanceScope,
        payment_id: PaymentRecordId,
        reason: &str,
    ) -> Result<payment_records::Model, ReconciliationError> {
        let payment_row = self.load_payment(scope, payment_id).await?;
        let payment = tahsil_core::reconciliation::PaymentRecord::from(payment_row.clone());
        ReconciliationService::plan_failure(&payment)?;

        let mut active: payment_records::ActiveModel = payment_row.into();
        active.status = Set(PaymentStatus::Failed);
        active.failure_reason = Set(Some(reason.to_string()));
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Lists unsettled invoices in scope, soonest due first.
    ///
    /// # Errors
    ///
    /// Returns [`ReconciliationError::Database`] when the query fails.
    pub async fn list_outstanding_invoices(
        &self,
        scope: &FinanceScope,
        student_id: Option<StudentId>,
    ) -> Result<Vec<invoices::Model>, ReconciliationError> {
        let mut query = invoices::Entity::find()
            .filter(invoices::Column::OrganizationId.eq(scope.organization_id.into_inner()))
            .filter(
                invoices::Column::Status
                    .is_in([InvoiceStatus::Unpaid, InvoiceStatus::PartiallyPaid]),
            );
        if let Some(campus) = scope.campus_id {
            query = query.filter(invoices::Column::CampusId.eq(campus.into_inner()));
        }
        if let Some(student) = student_id {
            query = query.filter(invoices::Column::StudentId.eq(student.into_inner()));
        }
        query
            .order_by_asc(invoices::Column::DueDate)
            .order_by_asc(invoices::Column::InvoiceNo)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn load_payment(
        &self,
        scope: &FinanceScope,
        payment_id: PaymentRecordId,
    ) -> Result<payment_records::Model, ReconciliationError> {
        payment_records::Entity::find_by_id(payment_id.into_inner())
            .filter(
                payment_records::Column::OrganizationId
                    .eq(scope.organization_id.into_inner()),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ReconciliationError::PaymentNotFound(payment_id.into_inner()))
    }

    async fn load_pair(
        &self,
        scope: &FinanceScope,
        payment_id: PaymentRecordId,
    ) -> Result<(invoices::Model, payment_records::Model), ReconciliationError> {
        let payment = self.load_payment(scope, payment_id).await?;
        let invoice_uuid = payment
            .invoice_id
            .ok_or(ReconciliationError::InvoiceNotFound(payment_id.into_inner()))?;

        let invoice = invoices::Entity::find_by_id(invoice_uuid)
            .filter(invoices::Column::OrganizationId.eq(scope.organization_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ReconciliationError::InvoiceNotFound(invoice_uuid))?;

        Ok((invoice, payment))
    }
}
