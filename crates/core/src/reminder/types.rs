//! Reminder domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{
    CampusId, InvoiceId, OrganizationId, ReminderRuleId, StudentId,
};

/// What situation a reminder rule fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderTrigger {
    /// A fixed number of days before the due date.
    BeforeDue,
    /// Inside a days-overdue window.
    AfterDue,
    /// Late-stage escalation, also windowed on days overdue.
    FinalNotice,
    /// Overdue with a nonzero paid amount; outranks plain AfterDue.
    PartialPayment,
}

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderChannel {
    /// Text message.
    Sms,
    /// Email.
    Email,
    /// WhatsApp message.
    Whatsapp,
}

/// Outcome of one reminder dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderLogStatus {
    /// The delivery job was enqueued.
    Sent,
    /// Enqueueing failed; the error detail is logged.
    Failed,
}

/// A dunning rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRule {
    /// Rule ID.
    pub id: ReminderRuleId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// When set, the rule only covers this campus and outranks
    /// organization-wide rules.
    pub campus_id: Option<CampusId>,
    /// Display name.
    pub name: String,
    /// Trigger family.
    pub trigger: ReminderTrigger,
    /// Exact days before due, for BeforeDue rules.
    pub days_before: Option<i64>,
    /// Minimum days overdue, for the after-due families.
    pub min_days_overdue: i64,
    /// Maximum days overdue, when the window is bounded above.
    pub max_days_overdue: Option<i64>,
    /// Delivery channel.
    pub channel: ReminderChannel,
    /// Minimum days between two sends to the same (student, rule) pair.
    pub frequency_days: i64,
    /// Default message template.
    pub template: String,
    /// Inactive rules never match.
    pub is_active: bool,
}

impl ReminderRule {
    /// Whether the rule matches an invoice that is `days_overdue` past due
    /// (negative means not yet due) and has `paid_amount` applied.
    #[must_use]
    pub fn matches(&self, days_overdue: i64, paid_amount: Decimal) -> bool {
        if !self.is_active {
            return false;
        }
        match self.trigger {
            ReminderTrigger::BeforeDue => self.days_before == Some(-days_overdue),
            ReminderTrigger::AfterDue | ReminderTrigger::FinalNotice => {
                days_overdue >= self.min_days_overdue
                    && self.max_days_overdue.is_none_or(|max| days_overdue <= max)
            }
            ReminderTrigger::PartialPayment => {
                paid_amount > Decimal::ZERO
                    && days_overdue >= self.min_days_overdue
                    && self.max_days_overdue.is_none_or(|max| days_overdue <= max)
            }
        }
    }
}

/// The invoice and student fields a reminder needs, denormalized for
/// matching and token rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceReminderSnapshot {
    /// The invoice.
    pub invoice_id: InvoiceId,
    /// The billed student.
    pub student_id: StudentId,
    /// The student's campus.
    pub campus_id: CampusId,
    /// Invoice number.
    pub invoice_no: String,
    /// Amount billed.
    pub total_amount: Decimal,
    /// Amount applied so far.
    pub paid_amount: Decimal,
    /// Payment deadline.
    pub due_date: NaiveDate,
    /// Student display name.
    pub student_name: String,
    /// Admission number, when assigned.
    pub admission_no: Option<String>,
    /// Grade, when assigned.
    pub grade: Option<String>,
    /// Campus display name.
    pub campus_name: String,
}

impl InvoiceReminderSnapshot {
    /// Remaining amount owed.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        (self.total_amount - self.paid_amount).max(Decimal::ZERO)
    }

    /// Days past due as of `today`; negative means not yet due.
    #[must_use]
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        (today - self.due_date).num_days()
    }
}

/// One reminder the plan wants dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedReminder {
    /// Target student.
    pub student_id: StudentId,
    /// Invoice the reminder is about.
    pub invoice_id: InvoiceId,
    /// Rule that matched.
    pub rule_id: ReminderRuleId,
    /// Trigger of the matched rule.
    pub trigger: ReminderTrigger,
    /// Channel to deliver on.
    pub channel: ReminderChannel,
    /// Fully rendered message body.
    pub message: String,
}

/// Aggregate counters for one engine run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunCounts {
    /// Invoices examined.
    pub processed: usize,
    /// Reminders whose delivery job was enqueued.
    pub sent: usize,
    /// Invoices skipped (no match, resend interval, or same-run dedupe).
    pub skipped: usize,
    /// Reminders whose enqueue failed.
    pub failed: usize,
    /// Error details, bounded so a broken queue cannot balloon the result.
    pub errors: Vec<String>,
}

impl RunCounts {
    /// Cap on retained error messages.
    pub const MAX_ERRORS: usize = 20;

    /// Tallies a dispatch failure.
    pub fn record_failure(&mut self, error: String) {
        self.failed += 1;
        if self.errors.len() < Self::MAX_ERRORS {
            self.errors.push(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn rule(trigger: ReminderTrigger) -> ReminderRule {
        ReminderRule {
            id: ReminderRuleId::new(),
            organization_id: OrganizationId::new(),
            campus_id: None,
            name: "test".to_string(),
            trigger,
            days_before: Some(3),
            min_days_overdue: 7,
            max_days_overdue: Some(30),
            channel: ReminderChannel::Sms,
            frequency_days: 7,
            template: "{{studentName}}".to_string(),
            is_active: true,
        }
    }

    #[rstest]
    #[case(-3, true)]
    #[case(-2, false)]
    #[case(3, false)]
    fn test_before_due_is_exact(#[case] days_overdue: i64, #[case] expected: bool) {
        assert_eq!(
            rule(ReminderTrigger::BeforeDue).matches(days_overdue, dec!(0)),
            expected
        );
    }

    #[rstest]
    #[case(6, false)]
    #[case(7, true)]
    #[case(30, true)]
    #[case(31, false)]
    fn test_after_due_window(#[case] days_overdue: i64, #[case] expected: bool) {
        assert_eq!(
            rule(ReminderTrigger::AfterDue).matches(days_overdue, dec!(0)),
            expected
        );
    }

    #[test]
    fn test_unbounded_window() {
        let mut unbounded = rule(ReminderTrigger::FinalNotice);
        unbounded.min_days_overdue = 60;
        unbounded.max_days_overdue = None;
        assert!(unbounded.matches(400, dec!(0)));
        assert!(!unbounded.matches(59, dec!(0)));
    }

    #[test]
    fn test_partial_payment_needs_paid_amount() {
        let partial = rule(ReminderTrigger::PartialPayment);
        assert!(!partial.matches(10, dec!(0)));
        assert!(partial.matches(10, dec!(500)));
    }

    #[test]
    fn test_inactive_rule_never_matches() {
        let mut inactive = rule(ReminderTrigger::AfterDue);
        inactive.is_active = false;
        assert!(!inactive.matches(10, dec!(0)));
    }

    #[test]
    fn test_error_list_is_bounded() {
        let mut counts = RunCounts::default();
        for i in 0..50 {
            counts.record_failure(format!("enqueue failed: {i}"));
        }
        assert_eq!(counts.failed, 50);
        assert_eq!(counts.errors.len(), RunCounts::MAX_ERRORS);
    }
}
