//! Reminder repository: rule management, engine runs, and dispatch logs.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tahsil_core::reminder::{
    plan_run, select_rule, render, resolve_template, tokens_for, InvoiceReminderSnapshot,
    LastSentIndex, PlannedReminder, ReminderChannel, ReminderError, ReminderRule,
    ReminderTrigger, RunCounts,
};
use tahsil_shared::config::FinanceConfig;
use tahsil_shared::scope::FinanceScope;
use tahsil_shared::types::{CampusId, InvoiceId, ReminderLogId, ReminderRuleId, StudentId};
use uuid::Uuid;

use crate::entities::{
    campuses, invoices, jobs, reminder_logs, reminder_rules, reminder_templates,
    sea_orm_active_enums::{self, InvoiceStatus, JobStatus},
    students,
};

fn db_err(err: DbErr) -> ReminderError {
    ReminderError::Database(err.to_string())
}

/// Input for creating a reminder rule.
#[derive(Debug, Clone)]
pub struct CreateReminderRuleInput {
    /// Campus scope; `None` means organization-wide.
    pub campus_id: Option<CampusId>,
    /// Display name.
    pub name: String,
    /// Trigger family.
    pub trigger: ReminderTrigger,
    /// Exact days before due, for before-due rules.
    pub days_before: Option<i32>,
    /// Minimum days overdue.
    pub min_days_overdue: i32,
    /// Maximum days overdue, when bounded.
    pub max_days_overdue: Option<i32>,
    /// Delivery channel.
    pub channel: ReminderChannel,
    /// Minimum days between two sends to the same (student, rule) pair.
    pub frequency_days: i32,
    /// Default message template.
    pub template: String,
}

/// Partial update for a reminder rule. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateReminderRuleInput {
    /// New display name.
    pub name: Option<String>,
    /// New template body.
    pub template: Option<String>,
    /// New resend interval.
    pub frequency_days: Option<i32>,
    /// New minimum days overdue.
    pub min_days_overdue: Option<i32>,
    /// New maximum days overdue.
    pub max_days_overdue: Option<i32>,
    /// New days-before offset.
    pub days_before: Option<i32>,
    /// Activate or deactivate the rule.
    pub is_active: Option<bool>,
}

/// One row of reminder delivery statistics.
#[derive(Debug, Clone)]
pub struct ReminderStat {
    /// Delivery channel.
    pub channel: sea_orm_active_enums::ReminderChannel,
    /// Dispatch outcome.
    pub status: sea_orm_active_enums::ReminderLogStatus,
    /// Number of log rows.
    pub count: u64,
}

/// Repository for the reminder engine.
#[derive(Debug, Clone)]
pub struct ReminderRepository {
    db: DatabaseConnection,
    payment_link_base: Option<String>,
}

impl ReminderRepository {
    /// Creates a new reminder repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, finance: &FinanceConfig) -> Self {
        Self {
            db,
            payment_link_base: finance.payment_link_base.clone(),
        }
    }

    /// Runs the reminder engine over every unsettled invoice in scope.
    ///
    /// Each planned reminder is enqueued as a delivery job and logged; a
    /// failed enqueue is tallied with its error and never aborts the run.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Database`] when the inputs cannot be loaded
    /// or a log row cannot be written.
    pub async fn run_engine(
        &self,
        scope: &FinanceScope,
        today: NaiveDate,
    ) -> Result<RunCounts, ReminderError> {
        let snapshots = self.load_snapshots(scope, None).await?;
        let rules = self.load_active_rules(scope).await?;
        let overrides = self.load_overrides(scope).await?;
        let last_sent = self.load_last_sent(scope).await?;

        let outcome = plan_run(
            &snapshots,
            &rules,
            &overrides,
            &last_sent,
            today,
            self.payment_link_base.as_deref(),
        );

        let mut counts = RunCounts {
            processed: snapshots.len(),
            skipped: outcome.skipped,
            ..RunCounts::default()
        };

        for planned in &outcome.planned {
            match self.enqueue_delivery(scope, planned).await {
                Ok(()) => {
                    self.insert_log(scope, planned, None).await?;
                    counts.sent += 1;
                }
                Err(err) => {
                    let detail = err.to_string();
                    self.insert_log(scope, planned, Some(detail.clone())).await?;
                    counts.record_failure(detail);
                }
            }
        }

        tracing::info!(
            processed = counts.processed,
            sent = counts.sent,
            skipped = counts.skipped,
            failed = counts.failed,
            "reminder run finished"
        );
        Ok(counts)
    }

    /// Sends a reminder for one invoice on demand.
    ///
    /// The resend interval is deliberately bypassed: a manual trigger is an
    /// explicit operator decision. Returns `None` when no active rule
    /// matches the invoice's state.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::InvoiceNotFound`] when the invoice is not an
    /// unsettled invoice of this organization.
    pub async fn trigger_invoice_reminder(
        &self,
        scope: &FinanceScope,
        invoice_id: InvoiceId,
        today: NaiveDate,
    ) -> Result<Option<reminder_logs::Model>, ReminderError> {
        let snapshots = self.load_snapshots(scope, Some(invoice_id)).await?;
        let Some(snapshot) = snapshots.first() else {
            return Err(ReminderError::InvoiceNotFound(invoice_id.into_inner()));
        };

        let rules = self.load_active_rules(scope).await?;
        let Some(rule) = select_rule(snapshot, &rules, today) else {
            return Ok(None);
        };

        let overrides = self.load_overrides(scope).await?;
        let tokens = tokens_for(snapshot, today, self.payment_link_base.as_deref());
        let message = render(resolve_template(rule, &overrides), &tokens);

        let planned = PlannedReminder {
            student_id: snapshot.student_id,
            invoice_id: snapshot.invoice_id,
            rule_id: rule.id,
            trigger: rule.trigger,
            channel: rule.channel,
            message,
        };

        let error_detail = match self.enqueue_delivery(scope, &planned).await {
            Ok(()) => None,
            Err(err) => Some(err.to_string()),
        };
        let log = self.insert_log(scope, &planned, error_detail).await?;
        Ok(Some(log))
    }

    /// Creates a reminder rule.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Database`] when the insert fails.
    pub async fn create_rule(
        &self,
        scope: &FinanceScope,
        input: CreateReminderRuleInput,
    ) -> Result<reminder_rules::Model, ReminderError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        reminder_rules::ActiveModel {
            id: Set(ReminderRuleId::new().into_inner()),
            organization_id: Set(scope.organization_id.into_inner()),
            campus_id: Set(input.campus_id.map(CampusId::into_inner)),
            name: Set(input.name),
            trigger: Set(input.trigger.into()),
            days_before: Set(input.days_before),
            min_days_overdue: Set(input.min_days_overdue),
            max_days_overdue: Set(input.max_days_overdue),
            channel: Set(input.channel.into()),
            frequency_days: Set(input.frequency_days),
            template: Set(input.template),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)
    }

    /// Applies a partial update to a rule.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::RuleNotFound`] when the rule is not in this
    /// organization.
    pub async fn update_rule(
        &self,
        scope: &FinanceScope,
        rule_id: ReminderRuleId,
        input: UpdateReminderRuleInput,
    ) -> Result<reminder_rules::Model, ReminderError> {
        let rule = self.load_rule(scope, rule_id).await?;

        let mut active: reminder_rules::ActiveModel = rule.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(template) = input.template {
            active.template = Set(template);
        }
        if let Some(frequency_days) = input.frequency_days {
            active.frequency_days = Set(frequency_days);
        }
        if let Some(min_days) = input.min_days_overdue {
            active.min_days_overdue = Set(min_days);
        }
        if let Some(max_days) = input.max_days_overdue {
            active.max_days_overdue = Set(Some(max_days));
        }
        if let Some(days_before) = input.days_before {
            active.days_before = Set(Some(days_before));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(db_err)
    }

    /// Deactivates a rule; history is kept, so this is a soft delete.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::RuleNotFound`] when the rule is not in this
    /// organization.
    pub async fn deactivate_rule(
        &self,
        scope: &FinanceScope,
        rule_id: ReminderRuleId,
    ) -> Result<reminder_rules::Model, ReminderError> {
        let rule = self.load_rule(scope, rule_id).await?;
        let mut active: reminder_rules::ActiveModel = rule.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await.map_err(db_err)
    }

    /// Lists the organization's rules, active first.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Database`] when the query fails.
    pub async fn list_rules(
        &self,
        scope: &FinanceScope,
    ) -> Result<Vec<reminder_rules::Model>, ReminderError> {
        reminder_rules::Entity::find()
            .filter(
                reminder_rules::Column::OrganizationId.eq(scope.organization_id.into_inner()),
            )
            .order_by_desc(reminder_rules::Column::IsActive)
            .order_by_asc(reminder_rules::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Delivery statistics over log rows since `since`, grouped by channel
    /// and outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ReminderError::Database`] when the logs cannot be loaded.
    pub async fn stats(
        &self,
        scope: &FinanceScope,
        since: NaiveDate,
    ) -> Result<Vec<ReminderStat>, ReminderError> {
        use chrono::TimeZone;
        let cutoff =
            Utc.from_utc_datetime(&since.and_hms_opt(0, 0, 0).unwrap_or_default());

        let logs = reminder_logs::Entity::find()
            .filter(
                reminder_logs::Column::OrganizationId.eq(scope.organization_id.into_inner()),
            )
            .filter(reminder_logs::Column::SentAt.gte(cutoff))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut grouped: HashMap<
            (
                sea_orm_active_enums::ReminderChannel,
                sea_orm_active_enums::ReminderLogStatus,
            ),
            u64,
        > = HashMap::new();
        for log in logs {
            *grouped.entry((log.channel, log.status)).or_default() += 1;
        }

        let mut stats: Vec<ReminderStat> = grouped
            .into_iter()
            .map(|((channel, status), count)| ReminderStat {
                channel,
                status,
                count,
            })
            .collect();
        stats.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(stats)
    }

    async fn load_rule(
        &self,
        scope: &FinanceScope,
        rule_id: ReminderRuleId,
    ) -> Result<reminder_rules::Model, ReminderError> {
        reminder_rules::Entity::find_by_id(rule_id.into_inner())
            .filter(
                reminder_rules::Column::OrganizationId.eq(scope.organization_id.into_inner()),
            )
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(ReminderError::RuleNotFound(rule_id.into_inner()))
    }

    async fn load_active_rules(
        &self,
        scope: &FinanceScope,
    ) -> Result<Vec<ReminderRule>, ReminderError> {
        Ok(reminder_rules::Entity::find()
            .filter(
                reminder_rules::Column::OrganizationId.eq(scope.organization_id.into_inner()),
            )
            .filter(reminder_rules::Column::IsActive.eq(true))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(ReminderRule::from)
            .collect())
    }

    async fn load_overrides(
        &self,
        scope: &FinanceScope,
    ) -> Result<HashMap<(ReminderChannel, ReminderTrigger), String>, ReminderError> {
        Ok(reminder_templates::Entity::find()
            .filter(
                reminder_templates::Column::OrganizationId
                    .eq(scope.organization_id.into_inner()),
            )
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|row| ((row.channel.into(), row.trigger.into()), row.body))
            .collect())
    }

    async fn load_last_sent(&self, scope: &FinanceScope) -> Result<LastSentIndex, ReminderError> {
        let logs = reminder_logs::Entity::find()
            .filter(
                reminder_logs::Column::OrganizationId.eq(scope.organization_id.into_inner()),
            )
            .filter(
                reminder_logs::Column::Status.eq(sea_orm_active_enums::ReminderLogStatus::Sent),
            )
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut index = LastSentIndex::new();
        for log in logs {
            let pair = (
                StudentId::from_uuid(log.student_id),
                ReminderRuleId::from_uuid(log.reminder_rule_id),
            );
            let sent_on = log.sent_at.date_naive();
            index
                .entry(pair)
                .and_modify(|existing| {
                    if sent_on > *existing {
                        *existing = sent_on;
                    }
                })
                .or_insert(sent_on);
        }
        Ok(index)
    }

    /// Loads denormalized invoice snapshots for every unsettled invoice in
    /// scope, or one invoice when `invoice_id` is set.
    async fn load_snapshots(
        &self,
        scope: &FinanceScope,
        invoice_id: Option<InvoiceId>,
    ) -> Result<Vec<InvoiceReminderSnapshot>, ReminderError> {
        let org_uuid = scope.organization_id.into_inner();

        let mut invoice_query = invoices::Entity::find()
            .filter(invoices::Column::OrganizationId.eq(org_uuid))
            .filter(
                invoices::Column::Status
                    .is_in([InvoiceStatus::Unpaid, InvoiceStatus::PartiallyPaid]),
            );
        if let Some(invoice) = invoice_id {
            invoice_query = invoice_query.filter(invoices::Column::Id.eq(invoice.into_inner()));
        }
        if let Some(campus) = scope.campus_id {
            invoice_query =
                invoice_query.filter(invoices::Column::CampusId.eq(campus.into_inner()));
        }
        let invoice_rows = invoice_query
            .order_by_asc(invoices::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let student_rows = students::Entity::find()
            .filter(students::Column::OrganizationId.eq(org_uuid))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let students_by_id: HashMap<Uuid, students::Model> = student_rows
            .into_iter()
            .map(|student| (student.id, student))
            .collect();

        let campus_rows = campuses::Entity::find()
            .filter(campuses::Column::OrganizationId.eq(org_uuid))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        let campus_names: HashMap<Uuid, String> = campus_rows
            .into_iter()
            .map(|campus| (campus.id, campus.name))
            .collect();

        let snapshots = invoice_rows
            .into_iter()
            .filter_map(|invoice| {
                let student = students_by_id.get(&invoice.student_id)?;
                Some(InvoiceReminderSnapshot {
                    invoice_id: InvoiceId::from_uuid(invoice.id),
                    student_id: StudentId::from_uuid(invoice.student_id),
                    campus_id: CampusId::from_uuid(invoice.campus_id),
                    invoice_no: invoice.invoice_no,
                    total_amount: invoice.total_amount,
                    paid_amount: invoice.paid_amount,
                    due_date: invoice.due_date,
                    student_name: student.name.clone(),
                    admission_no: student.admission_no.clone(),
                    grade: student.grade.clone(),
                    campus_name: campus_names
                        .get(&invoice.campus_id)
                        .cloned()
                        .unwrap_or_default(),
                })
            })
            .collect();

        Ok(snapshots)
    }

    /// Inserts the delivery job for a planned reminder.
    async fn enqueue_delivery(
        &self,
        scope: &FinanceScope,
        planned: &PlannedReminder,
    ) -> Result<(), ReminderError> {
        let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
        jobs::ActiveModel {
            id: Set(Uuid::now_v7()),
            organization_id: Set(scope.organization_id.into_inner()),
            queue: Set("reminders".to_string()),
            payload: Set(serde_json::json!({
                "student_id": planned.student_id,
                "invoice_id": planned.invoice_id,
                "rule_id": planned.rule_id,
                "channel": planned.channel,
                "trigger": planned.trigger,
                "message": planned.message,
            })),
            status: Set(JobStatus::Queued),
            attempts: Set(0),
            last_error: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|err| ReminderError::EnqueueFailed(err.to_string()))?;
        Ok(())
    }

    /// Writes the dispatch log row; `error_detail` marks a failed enqueue.
    async fn insert_log(
        &self,
        scope: &FinanceScope,
        planned: &PlannedReminder,
        error_detail: Option<String>,
    ) -> Result<reminder_logs::Model, ReminderError> {
        let status = if error_detail.is_none() {
            sea_orm_active_enums::ReminderLogStatus::Sent
        } else {
            sea_orm_active_enums::ReminderLogStatus::Failed
        };

        reminder_logs::ActiveModel {
            id: Set(ReminderLogId::new().into_inner()),
            organization_id: Set(scope.organization_id.into_inner()),
            student_id: Set(planned.student_id.into_inner()),
            invoice_id: Set(planned.invoice_id.into_inner()),
            reminder_rule_id: Set(planned.rule_id.into_inner()),
            trigger: Set(planned.trigger.into()),
            channel: Set(planned.channel.into()),
            status: Set(status),
            message_body: Set(planned.message.clone()),
            error_detail: Set(error_detail),
            sent_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)
    }
}
