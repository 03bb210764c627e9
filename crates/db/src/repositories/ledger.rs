//! Ledger repository: balances, statements, aging, defaulters, and metrics.

use std::collections::HashMap;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tahsil_core::ledger::{
    age_invoices, assess_risk, build_statement, find_defaulters, AgingSnapshot, BalanceSummary,
    CollectionMetrics, DefaulterCandidate, DefaulterPage, DefaulterQuery, EntryDirection,
    EntryKind, LedgerEntry, LedgerEntrySeed, LedgerError, LedgerReference, OutstandingInvoice,
    RiskLevel, Statement,
};
use tahsil_shared::scope::FinanceScope;
use tahsil_shared::types::{BillingPeriod, CampusId, InvoiceId, StudentId};

use crate::entities::{
    invoices, ledger_entries, sea_orm_active_enums::InvoiceStatus, student_balance_summaries,
    students,
};

use super::ledger_writes;

fn db_err(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}

/// Aging and risk for one campus.
#[derive(Debug, Clone)]
pub struct CampusAging {
    /// The campus.
    pub campus_id: CampusId,
    /// Its aging buckets.
    pub aging: AgingSnapshot,
    /// Risk derived from the buckets.
    pub risk: RiskLevel,
}

/// Repository for ledger reads, projections, and analytics.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads a student's materialized balance summary. O(1): no ledger scan.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::StudentNotFound`] when the student is not in
    /// this organization.
    pub async fn get_summary(
        &self,
        scope: &FinanceScope,
        student_id: StudentId,
    ) -> Result<BalanceSummary, LedgerError> {
        self.require_student(scope, student_id).await?;
        ledger_writes::load_summary(&self.db, student_id)
            .await
            .map_err(db_err)
    }

    /// Rebuilds one student's summary from a full ledger rescan.
    ///
    /// Corrects any drift between the projection and the append-only ledger;
    /// the rescan and the overwrite commit in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::StudentNotFound`] when the student is not in
    /// this organization.
    pub async fn repair_summary(
        &self,
        scope: &FinanceScope,
        student_id: StudentId,
    ) -> Result<BalanceSummary, LedgerError> {
        self.require_student(scope, student_id).await?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let entries = self
            .entries_for_student(&txn, student_id, None, None)
            .await
            .map_err(db_err)?;
        let summary = BalanceSummary::from_entries(student_id, &entries);
        ledger_writes::store_summary(&txn, scope.organization_id.into_inner(), &summary)
            .await
            .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        tracing::info!(student_id = %student_id, balance = %summary.balance, "summary repaired");
        Ok(summary)
    }

    /// Rebuilds every summary in the organization. Returns the number of
    /// students repaired.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] when any rescan fails.
    pub async fn repair_all_summaries(
        &self,
        scope: &FinanceScope,
    ) -> Result<usize, LedgerError> {
        let student_rows = students::Entity::find()
            .filter(students::Column::OrganizationId.eq(scope.organization_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut repaired = 0usize;
        for student in student_rows {
            let student_id = StudentId::from_uuid(student.id);
            let txn = self.db.begin().await.map_err(db_err)?;
            let entries = self
                .entries_for_student(&txn, student_id, None, None)
                .await
                .map_err(db_err)?;
            let summary = BalanceSummary::from_entries(student_id, &entries);
            ledger_writes::store_summary(&txn, scope.organization_id.into_inner(), &summary)
                .await
                .map_err(db_err)?;
            txn.commit().await.map_err(db_err)?;
            repaired += 1;
        }

        Ok(repaired)
    }

    /// Builds a student statement over a date range (inclusive).
    ///
    /// The opening balance is the net of every entry strictly before the
    /// range start; each line carries a running balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidDateRange`] when `from` is after `to`.
    pub async fn statement(
        &self,
        scope: &FinanceScope,
        student_id: StudentId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Statement, LedgerError> {
        if from > to {
            return Err(LedgerError::InvalidDateRange { start: from, end: to });
        }
        self.require_student(scope, student_id).await?;

        let prior = self
            .entries_for_student(&self.db, student_id, None, Some(from))
            .await
            .map_err(db_err)?;
        let opening = prior
            .iter()
            .fold(Decimal::ZERO, |acc, entry| acc + entry.signed_amount());

        let in_range = self
            .entries_for_student(&self.db, student_id, Some(from), Some(next_day(to)))
            .await
            .map_err(db_err)?;

        Ok(build_statement(in_range, opening))
    }

    /// Appends a manual adjustment entry to a student's ledger.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] for a zero or negative
    /// amount.
    pub async fn record_adjustment(
        &self,
        scope: &FinanceScope,
        student_id: StudentId,
        direction: EntryDirection,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<ledger_entries::Model, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        self.require_student(scope, student_id).await?;

        let seed = LedgerEntrySeed {
            student_id,
            direction,
            kind: EntryKind::Adjustment,
            amount,
            reference: LedgerReference::None,
            note,
        };

        let txn = self.db.begin().await.map_err(db_err)?;
        let entry = ledger_writes::append_entry(
            &txn,
            scope.organization_id.into_inner(),
            &seed,
            Utc::now(),
        )
        .await
        .map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        Ok(entry)
    }

    /// Ages every outstanding invoice in scope and derives the risk level.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] when the invoices cannot be loaded.
    pub async fn aging(
        &self,
        scope: &FinanceScope,
        today: NaiveDate,
    ) -> Result<(AgingSnapshot, RiskLevel), LedgerError> {
        let outstanding = self.outstanding_invoices(scope).await?;
        let invoices: Vec<OutstandingInvoice> =
            outstanding.into_iter().map(|(_, invoice)| invoice).collect();
        let snapshot = age_invoices(&invoices, today);
        let risk = assess_risk(&snapshot);
        Ok((snapshot, risk))
    }

    /// Aging broken down per campus, each with its own risk level.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] when the invoices cannot be loaded.
    pub async fn campus_aging(
        &self,
        scope: &FinanceScope,
        today: NaiveDate,
    ) -> Result<Vec<CampusAging>, LedgerError> {
        let outstanding = self.outstanding_invoices(scope).await?;

        let mut by_campus: HashMap<CampusId, Vec<OutstandingInvoice>> = HashMap::new();
        for (campus_id, invoice) in outstanding {
            by_campus.entry(campus_id).or_default().push(invoice);
        }

        let mut result: Vec<CampusAging> = by_campus
            .into_iter()
            .map(|(campus_id, invoices)| {
                let aging = age_invoices(&invoices, today);
                let risk = assess_risk(&aging);
                CampusAging {
                    campus_id,
                    aging,
                    risk,
                }
            })
            .collect();
        result.sort_by(|a, b| b.aging.overdue_total().cmp(&a.aging.overdue_total()));

        Ok(result)
    }

    /// Detects defaulters in scope with the requested filter, sort, and
    /// pagination.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] when the candidate rows cannot be
    /// loaded.
    pub async fn defaulters(
        &self,
        scope: &FinanceScope,
        query: &DefaulterQuery,
        today: NaiveDate,
    ) -> Result<DefaulterPage, LedgerError> {
        let org_uuid = scope.organization_id.into_inner();

        let mut student_query = students::Entity::find()
            .filter(students::Column::OrganizationId.eq(org_uuid))
            .filter(students::Column::IsActive.eq(true));
        if let Some(campus) = scope.campus_id {
            student_query =
                student_query.filter(students::Column::CampusId.eq(campus.into_inner()));
        }
        let student_rows = student_query.all(&self.db).await.map_err(db_err)?;

        let summaries: HashMap<uuid::Uuid, Decimal> = student_balance_summaries::Entity::find()
            .filter(student_balance_summaries::Column::OrganizationId.eq(org_uuid))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| (row.student_id, row.balance))
            .collect();

        let mut invoices_by_student: HashMap<uuid::Uuid, Vec<OutstandingInvoice>> =
            HashMap::new();
        for (_, invoice) in self.outstanding_invoices(scope).await? {
            invoices_by_student
                .entry(invoice.student_id.into_inner())
                .or_default()
                .push(invoice);
        }

        let candidates: Vec<DefaulterCandidate> = student_rows
            .into_iter()
            .map(|student| DefaulterCandidate {
                student_id: StudentId::from_uuid(student.id),
                name: student.name,
                admission_no: student.admission_no,
                campus_id: CampusId::from_uuid(student.campus_id),
                summary_balance: summaries.get(&student.id).copied().unwrap_or_default(),
                invoices: invoices_by_student.remove(&student.id).unwrap_or_default(),
            })
            .collect();

        Ok(find_defaulters(&candidates, query, today))
    }

    /// Collection metrics for one billing period.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] when the window cannot be loaded.
    pub async fn collection_metrics(
        &self,
        scope: &FinanceScope,
        period: BillingPeriod,
    ) -> Result<CollectionMetrics, LedgerError> {
        let start = Utc.from_utc_datetime(&period.start_date().and_hms_opt(0, 0, 0).unwrap_or_default());
        let end = Utc.from_utc_datetime(
            &period
                .next()
                .start_date()
                .and_hms_opt(0, 0, 0)
                .unwrap_or_default(),
        );

        let rows = ledger_entries::Entity::find()
            .filter(
                ledger_entries::Column::OrganizationId.eq(scope.organization_id.into_inner()),
            )
            .filter(ledger_entries::Column::EntryDate.gte(start))
            .filter(ledger_entries::Column::EntryDate.lt(end))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut billed = Decimal::ZERO;
        let mut collected = Decimal::ZERO;
        for row in rows {
            let entry = LedgerEntry::from(row);
            match entry.direction {
                EntryDirection::Debit => billed += entry.amount,
                EntryDirection::Credit => collected += entry.amount,
            }
        }

        Ok(CollectionMetrics::new(period, billed, collected))
    }

    /// Collection metrics for the trailing `months` periods ending at
    /// `period`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] when any period window cannot be
    /// loaded.
    pub async fn collection_trend(
        &self,
        scope: &FinanceScope,
        period: BillingPeriod,
        months: usize,
    ) -> Result<Vec<CollectionMetrics>, LedgerError> {
        let mut periods = Vec::with_capacity(months);
        let mut cursor = period;
        for _ in 0..months {
            periods.push(cursor);
            cursor = cursor.previous();
        }
        periods.reverse();

        let mut trend = Vec::with_capacity(periods.len());
        for entry_period in periods {
            trend.push(self.collection_metrics(scope, entry_period).await?);
        }
        Ok(trend)
    }

    async fn require_student(
        &self,
        scope: &FinanceScope,
        student_id: StudentId,
    ) -> Result<(), LedgerError> {
        let found = students::Entity::find_by_id(student_id.into_inner())
            .filter(students::Column::OrganizationId.eq(scope.organization_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        if found.is_none() {
            return Err(LedgerError::StudentNotFound(student_id.into_inner()));
        }
        Ok(())
    }

    async fn entries_for_student<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        student_id: StudentId,
        from: Option<NaiveDate>,
        before: Option<NaiveDate>,
    ) -> Result<Vec<LedgerEntry>, DbErr> {
        let mut query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::StudentId.eq(student_id.into_inner()));
        if let Some(from) = from {
            let start =
                Utc.from_utc_datetime(&from.and_hms_opt(0, 0, 0).unwrap_or_default());
            query = query.filter(ledger_entries::Column::EntryDate.gte(start));
        }
        if let Some(before) = before {
            let end =
                Utc.from_utc_datetime(&before.and_hms_opt(0, 0, 0).unwrap_or_default());
            query = query.filter(ledger_entries::Column::EntryDate.lt(end));
        }

        let rows = query
            .order_by_asc(ledger_entries::Column::EntryDate)
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    async fn outstanding_invoices(
        &self,
        scope: &FinanceScope,
    ) -> Result<Vec<(CampusId, OutstandingInvoice)>, LedgerError> {
        let mut query = invoices::Entity::find()
            .filter(invoices::Column::OrganizationId.eq(scope.organization_id.into_inner()))
            .filter(
                invoices::Column::Status
                    .is_in([InvoiceStatus::Unpaid, InvoiceStatus::PartiallyPaid]),
            );
        if let Some(campus) = scope.campus_id {
            query = query.filter(invoices::Column::CampusId.eq(campus.into_inner()));
        }
        let rows = query.all(&self.db).await.map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let outstanding = (row.total_amount - row.paid_amount).max(Decimal::ZERO);
                (
                    CampusId::from_uuid(row.campus_id),
                    OutstandingInvoice {
                        invoice_id: InvoiceId::from_uuid(row.id),
                        student_id: StudentId::from_uuid(row.student_id),
                        outstanding,
                        due_date: row.due_date,
                    },
                )
            })
            .collect())
    }
}

/// The start of the day after `date`, saturating at `date` itself on
/// calendar overflow.
fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt().unwrap_or(date)
}
