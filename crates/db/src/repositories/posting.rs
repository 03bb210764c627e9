//! Posting repository: executes posting plans in chunked transactions.

use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tahsil_core::invoice::invoice_number;
use tahsil_core::ledger::{EntryDirection, EntryKind, LedgerEntrySeed, LedgerReference};
use tahsil_core::posting::{
    InvoiceSeed, PostingEngine, PostingError, PostingRequest, StudentSnapshot,
};
use tahsil_shared::config::FinanceConfig;
use tahsil_shared::scope::FinanceScope;
use tahsil_shared::types::{
    BillingPeriod, BillingRuleId, CampusId, InvoiceId, PostingRunId, StudentId,
};
use uuid::Uuid;

use crate::entities::{
    billing_rules, invoices, jobs, posting_runs,
    sea_orm_active_enums::{InvoiceStatus, JobStatus, PostingRunStatus},
    students,
};

use super::ledger_writes;
use super::routing::RoutingRepository;

fn db_err(err: DbErr) -> PostingError {
    PostingError::Database(err.to_string())
}

/// Repository for posting runs and invoice issuance.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
    chunk_size: usize,
    due_day_of_month: u32,
}

impl PostingRepository {
    /// Creates a new posting repository with the configured chunking.
    #[must_use]
    pub fn new(db: DatabaseConnection, finance: &FinanceConfig) -> Self {
        Self {
            db,
            chunk_size: finance.posting_chunk_size.max(1),
            due_day_of_month: finance.due_day_of_month,
        }
    }

    /// Runs monthly posting for a period.
    ///
    /// The run row is created first; the partial unique index on
    /// (organization, period, scope) rejects a second concurrent run
    /// atomically. Seeds are then executed in chunks, one transaction per
    /// chunk, with per-invoice dedupe so a retry after a failed run skips
    /// the invoices whose chunks already committed.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::DuplicateRun`] when a live run already covers
    /// the period and scope, [`PostingError::NoEligibleRules`] when nothing
    /// matches, and [`PostingError::Database`] when a chunk fails (the run is
    /// marked failed; committed chunks stand).
    pub async fn run_monthly_posting(
        &self,
        scope: &FinanceScope,
        period: BillingPeriod,
        campus_id: Option<CampusId>,
        due_date_override: Option<NaiveDate>,
    ) -> Result<posting_runs::Model, PostingError> {
        let run = self.insert_run(scope, period, campus_id).await?;

        let plan = match self.plan(scope, period, campus_id, due_date_override).await {
            Ok(plan) => plan,
            Err(err) => {
                self.mark_run_failed(&run, &err.to_string()).await?;
                return Err(err);
            }
        };

        let mut invoices_created = 0i64;
        let mut amount_posted = Decimal::ZERO;
        let mut billed_students: HashSet<Uuid> = HashSet::new();

        for chunk in plan.seeds.chunks(self.chunk_size) {
            match self.execute_chunk(scope, run.id, chunk).await {
                Ok((count, amount, students)) => {
                    invoices_created += count;
                    amount_posted += amount;
                    billed_students.extend(students);
                }
                Err(err) => {
                    tracing::error!(run_id = %run.id, error = %err, "posting chunk failed");
                    self.mark_run_failed(&run, &err.to_string()).await?;
                    self.enqueue_event(
                        scope,
                        "posting.failed",
                        serde_json::json!({
                            "run_id": run.id,
                            "period": period.to_string(),
                            "error": err.to_string(),
                        }),
                    )
                    .await;
                    return Err(db_err(err));
                }
            }
        }

        let mut active: posting_runs::ActiveModel = run.into();
        active.status = Set(PostingRunStatus::Completed);
        // Touched students means students actually billed, not the plan's
        // pre-dedupe count: a re-run that skips everyone reports zero.
        active.total_students = Set(i64::try_from(billed_students.len()).unwrap_or(i64::MAX));
        active.total_invoices = Set(invoices_created);
        active.total_amount = Set(amount_posted);
        active.completed_at = Set(Some(Utc::now().into()));
        let completed = active.update(&self.db).await.map_err(db_err)?;

        tracing::info!(
            run_id = %completed.id,
            period = %period,
            invoices = invoices_created,
            "posting run completed"
        );
        self.enqueue_event(
            scope,
            "posting.completed",
            serde_json::json!({
                "run_id": completed.id,
                "period": period.to_string(),
                "invoices": invoices_created,
                "amount": amount_posted,
            }),
        )
        .await;

        Ok(completed)
    }

    /// Issues a single ad hoc invoice outside a posting run.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::DuplicateInvoice`] when the (student, period,
    /// rule) pair is already billed.
    pub async fn issue_invoice(
        &self,
        scope: &FinanceScope,
        student_id: StudentId,
        billing_rule_id: BillingRuleId,
        period: BillingPeriod,
        due_date_override: Option<NaiveDate>,
    ) -> Result<invoices::Model, PostingError> {
        let org_uuid = scope.organization_id.into_inner();

        let rule = billing_rules::Entity::find_by_id(billing_rule_id.into_inner())
            .filter(billing_rules::Column::OrganizationId.eq(org_uuid))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::NoEligibleRules { period })?;

        let student = students::Entity::find_by_id(student_id.into_inner())
            .filter(students::Column::OrganizationId.eq(org_uuid))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                PostingError::Internal(format!("student {student_id} not found"))
            })?;

        let campus_id = CampusId::from_uuid(student.campus_id);
        let routing = RoutingRepository::new(self.db.clone());
        // Attribution is best-effort here too: a routing failure issues the
        // invoice without a bank account.
        let bank_account_id = routing
            .resolve_for_campus(scope, campus_id, None)
            .await
            .ok()
            .map(|routed| routed.bank_account_id);

        let seed = InvoiceSeed {
            student_id,
            campus_id,
            billing_rule_id,
            invoice_no: invoice_number(period, student_id, billing_rule_id),
            amount: rule.amount,
            due_date: due_date_override.unwrap_or_else(|| period.due_date(self.due_day_of_month)),
            bank_account_id,
            period,
        };

        let txn = self.db.begin().await.map_err(db_err)?;
        let inserted = insert_invoice(&txn, org_uuid, None, &seed)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::DuplicateInvoice {
                student_id: student_id.into_inner(),
                period,
            })?;
        txn.commit().await.map_err(db_err)?;

        Ok(inserted)
    }

    /// Lists posting runs, newest period first.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::Database`] when the query fails.
    pub async fn list_runs(
        &self,
        scope: &FinanceScope,
    ) -> Result<Vec<posting_runs::Model>, PostingError> {
        let mut query = posting_runs::Entity::find()
            .filter(posting_runs::Column::OrganizationId.eq(scope.organization_id.into_inner()));
        if let Some(campus) = scope.campus_id {
            query = query.filter(posting_runs::Column::CampusId.eq(campus.into_inner()));
        }
        query
            .order_by_desc(posting_runs::Column::Year)
            .order_by_desc(posting_runs::Column::Month)
            .order_by_desc(posting_runs::Column::StartedAt)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Gets one posting run.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::RunNotFound`] when the run does not exist in
    /// this organization.
    pub async fn get_run(
        &self,
        scope: &FinanceScope,
        run_id: PostingRunId,
    ) -> Result<posting_runs::Model, PostingError> {
        posting_runs::Entity::find_by_id(run_id.into_inner())
            .filter(posting_runs::Column::OrganizationId.eq(scope.organization_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PostingError::RunNotFound(run_id.into_inner()))
    }

    /// Marks a failed run as superseded by its clean re-run.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::RunNotFailed`] when the run is not in the
    /// failed state.
    pub async fn supersede_run(
        &self,
        scope: &FinanceScope,
        run_id: PostingRunId,
        successor: PostingRunId,
    ) -> Result<posting_runs::Model, PostingError> {
        let run = self.get_run(scope, run_id).await?;
        if run.status != PostingRunStatus::Failed {
            return Err(PostingError::RunNotFailed(run_id.into_inner()));
        }

        let mut active: posting_runs::ActiveModel = run.into();
        active.superseded_by = Set(Some(successor.into_inner()));
        active.update(&self.db).await.map_err(db_err)
    }

    async fn insert_run(
        &self,
        scope: &FinanceScope,
        period: BillingPeriod,
        campus_id: Option<CampusId>,
    ) -> Result<posting_runs::Model, PostingError> {
        let result = posting_runs::ActiveModel {
            id: Set(PostingRunId::new().into_inner()),
            organization_id: Set(scope.organization_id.into_inner()),
            month: Set(i16::from(period.month)),
            year: Set(period.year),
            campus_id: Set(campus_id.map(CampusId::into_inner)),
            status: Set(PostingRunStatus::Processing),
            total_students: Set(0),
            total_invoices: Set(0),
            total_amount: Set(Decimal::ZERO),
            error_message: Set(None),
            started_at: Set(Utc::now().into()),
            completed_at: Set(None),
            superseded_by: Set(None),
        }
        .insert(&self.db)
        .await;

        result.map_err(|err| {
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                PostingError::DuplicateRun { period }
            } else {
                db_err(err)
            }
        })
    }

    async fn plan(
        &self,
        scope: &FinanceScope,
        period: BillingPeriod,
        campus_id: Option<CampusId>,
        due_date_override: Option<NaiveDate>,
    ) -> Result<tahsil_core::posting::PostingPlan, PostingError> {
        let org_uuid = scope.organization_id.into_inner();

        let rules: Vec<_> = billing_rules::Entity::find()
            .filter(billing_rules::Column::OrganizationId.eq(org_uuid))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(tahsil_core::posting::BillingRule::from)
            .collect();

        let mut student_query = students::Entity::find()
            .filter(students::Column::OrganizationId.eq(org_uuid))
            .filter(students::Column::IsActive.eq(true));
        if let Some(campus) = campus_id {
            student_query =
                student_query.filter(students::Column::CampusId.eq(campus.into_inner()));
        }
        let student_rows = student_query.all(&self.db).await.map_err(db_err)?;
        let snapshots: Vec<StudentSnapshot> = student_rows
            .into_iter()
            .map(|student| StudentSnapshot {
                student_id: StudentId::from_uuid(student.id),
                campus_id: CampusId::from_uuid(student.campus_id),
                grade: student.grade,
            })
            .collect();

        let routing = RoutingRepository::new(self.db.clone());
        let routed = routing
            .resolve_all(scope)
            .await
            .map_err(|err| PostingError::Database(err.to_string()))?;

        let request = PostingRequest {
            period,
            campus_id,
            due_date_override,
            due_day_of_month: self.due_day_of_month,
        };
        PostingEngine::plan(&request, &rules, &snapshots, &routed)
    }

    /// Executes one chunk of seeds in a single transaction.
    ///
    /// Returns the count and amount of invoices actually created; seeds whose
    /// (student, period, rule) pair is already billed are skipped.
    async fn execute_chunk(
        &self,
        scope: &FinanceScope,
        run_id: Uuid,
        seeds: &[InvoiceSeed],
    ) -> Result<(i64, Decimal, HashSet<Uuid>), DbErr> {
        let org_uuid = scope.organization_id.into_inner();
        let txn = self.db.begin().await?;

        let mut created = 0i64;
        let mut amount = Decimal::ZERO;
        let mut students = HashSet::new();
        for seed in seeds {
            if insert_invoice(&txn, org_uuid, Some(run_id), seed)
                .await?
                .is_some()
            {
                created += 1;
                amount += seed.amount;
                students.insert(seed.student_id.into_inner());
            }
        }

        txn.commit().await?;
        Ok((created, amount, students))
    }

    async fn mark_run_failed(
        &self,
        run: &posting_runs::Model,
        message: &str,
    ) -> Result<(), PostingError> {
        let mut active: posting_runs::ActiveModel = run.clone().into();
        active.status = Set(PostingRunStatus::Failed);
        active.error_message = Set(Some(message.to_string()));
        active.completed_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    /// Enqueues a lifecycle event job. Best-effort: a queue failure is logged
    /// and never fails the posting operation itself.
    async fn enqueue_event(
        &self,
        scope: &FinanceScope,
        event: &str,
        payload: serde_json::Value,
    ) {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        let job = jobs::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(scope.organization_id.into_inner()),
            queue: Set("events".to_string()),
            payload: Set(serde_json::json!({ "event": event, "data": payload })),
            status: Set(JobStatus::Queued),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        if let Err(err) = job.insert(&self.db).await {
            tracing::warn!(event, error = %err, "failed to enqueue posting event");
        }
    }
}

/// Inserts one invoice with its posting ledger entry, deduplicating on the
/// (student, period, rule) pair. Returns `None` when the pair is already
/// billed.
async fn insert_invoice(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    run_id: Option<Uuid>,
    seed: &InvoiceSeed,
) -> Result<Option<invoices::Model>, DbErr> {
    let existing = invoices::Entity::find()
        .filter(invoices::Column::StudentId.eq(seed.student_id.into_inner()))
        .filter(invoices::Column::BillingRuleId.eq(seed.billing_rule_id.into_inner()))
        .filter(invoices::Column::Month.eq(i16::from(seed.period.month)))
        .filter(invoices::Column::Year.eq(seed.period.year))
        .one(txn)
        .await?;
    if existing.is_some() {
        return Ok(None);
    }

    let now = Utc::now();
    let now_tz: sea_orm::prelude::DateTimeWithTimeZone = now.into();
    let invoice_id = InvoiceId::new();

    let invoice = invoices::ActiveModel {
        id: Set(invoice_id.into_inner()),
        organization_id: Set(organization_id),
        campus_id: Set(seed.campus_id.into_inner()),
        student_id: Set(seed.student_id.into_inner()),
        billing_rule_id: Set(seed.billing_rule_id.into_inner()),
        invoice_no: Set(seed.invoice_no.clone()),
        month: Set(i16::from(seed.period.month)),
        year: Set(seed.period.year),
        due_date: Set(seed.due_date),
        total_amount: Set(seed.amount),
        paid_amount: Set(Decimal::ZERO),
        status: Set(InvoiceStatus::Unpaid),
        bank_account_id: Set(seed.bank_account_id.map(tahsil_shared::types::BankAccountId::into_inner)),
        posting_run_id: Set(run_id),
        paid_at: Set(None),
        created_at: Set(now_tz),
        updated_at: Set(now_tz),
    }
    .insert(txn)
    .await?;

    let entry_seed = LedgerEntrySeed {
        student_id: seed.student_id,
        direction: EntryDirection::Debit,
        kind: EntryKind::InvoicePosted,
        amount: seed.amount,
        reference: LedgerReference::Invoice(invoice_id),
        note: None,
    };
    ledger_writes::append_entry(txn, organization_id, &entry_seed, now).await?;

    Ok(Some(invoice))
}
