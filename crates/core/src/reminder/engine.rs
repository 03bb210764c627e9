//! Rule selection and run planning.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tahsil_shared::types::{ReminderRuleId, StudentId};

use super::template::{render, resolve_template, tokens_for};
use super::types::{
    InvoiceReminderSnapshot, PlannedReminder, ReminderChannel, ReminderRule, ReminderTrigger,
};

/// Everything a run needs to decide resend eligibility: the date of the last
/// Sent log per (student, rule) pair.
pub type LastSentIndex = HashMap<(StudentId, ReminderRuleId), NaiveDate>;

/// Output of run planning: the reminders to dispatch plus the skip count.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Reminders to enqueue and log, in input order.
    pub planned: Vec<PlannedReminder>,
    /// Invoices examined without producing a reminder.
    pub skipped: usize,
}

/// Selects the rule for an invoice, or `None` when nothing matches.
///
/// Precedence: PartialPayment rules outrank plain AfterDue rules when the
/// invoice has a nonzero paid amount, and campus-scoped rules are tried
/// before organization-wide ones within the same trigger class.
#[must_use]
pub fn select_rule<'a>(
    snapshot: &InvoiceReminderSnapshot,
    rules: &'a [ReminderRule],
    today: NaiveDate,
) -> Option<&'a ReminderRule> {
    let days_overdue = snapshot.days_overdue(today);

    let mut candidates: Vec<&ReminderRule> = rules
        .iter()
        .filter(|rule| {
            rule.campus_id.is_none_or(|campus| campus == snapshot.campus_id)
                && rule.matches(days_overdue, snapshot.paid_amount)
        })
        .collect();

    let partial_paid = snapshot.paid_amount > Decimal::ZERO;
    candidates.sort_by_key(|rule| {
        let trigger_rank =
            if partial_paid && rule.trigger == ReminderTrigger::PartialPayment {
                0
            } else {
                1
            };
        let scope_rank = usize::from(rule.campus_id.is_none());
        (trigger_rank, scope_rank)
    });

    candidates.first().copied()
}

/// Plans one engine run over the loaded invoice snapshots.
///
/// An invoice is skipped when no rule matches, when its (student, rule) pair
/// was already planned earlier in the same run, or when the pair's last Sent
/// log is younger than the rule's resend interval.
#[must_use]
pub fn plan_run(
    snapshots: &[InvoiceReminderSnapshot],
    rules: &[ReminderRule],
    overrides: &HashMap<(ReminderChannel, ReminderTrigger), String>,
    last_sent: &LastSentIndex,
    today: NaiveDate,
    payment_link_base: Option<&str>,
) -> PlanOutcome {
    let mut planned = Vec::new();
    let mut skipped = 0usize;
    let mut seen: HashSet<(StudentId, ReminderRuleId)> = HashSet::new();

    for snapshot in snapshots {
        let Some(rule) = select_rule(snapshot, rules, today) else {
            skipped += 1;
            continue;
        };

        let pair = (snapshot.student_id, rule.id);
        if !seen.insert(pair) {
            skipped += 1;
            continue;
        }
        if let Some(sent_on) = last_sent.get(&pair)
            && (today - *sent_on).num_days() < rule.frequency_days
        {
            skipped += 1;
            continue;
        }

        let tokens = tokens_for(snapshot, today, payment_link_base);
        let message = render(resolve_template(rule, overrides), &tokens);

        planned.push(PlannedReminder {
            student_id: snapshot.student_id,
            invoice_id: snapshot.invoice_id,
            rule_id: rule.id,
            trigger: rule.trigger,
            channel: rule.channel,
            message,
        });
    }

    PlanOutcome { planned, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tahsil_shared::types::{CampusId, InvoiceId, OrganizationId};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    fn snapshot(days_overdue: i64, paid: Decimal) -> InvoiceReminderSnapshot {
        InvoiceReminderSnapshot {
            invoice_id: InvoiceId::new(),
            student_id: StudentId::new(),
            campus_id: CampusId::new(),
            invoice_no: "FP-202608-aaaaaaaa-bbbbbbbb".to_string(),
            total_amount: dec!(5000),
            paid_amount: paid,
            due_date: today() - chrono::Duration::days(days_overdue),
            student_name: "Ayesha Khan".to_string(),
            admission_no: None,
            grade: None,
            campus_name: "North Campus".to_string(),
        }
    }

    fn rule(trigger: ReminderTrigger, min: i64, max: Option<i64>) -> ReminderRule {
        ReminderRule {
            id: ReminderRuleId::new(),
            organization_id: OrganizationId::new(),
            campus_id: None,
            name: format!("{trigger:?}"),
            trigger,
            days_before: Some(3),
            min_days_overdue: min,
            max_days_overdue: max,
            channel: ReminderChannel::Sms,
            frequency_days: 7,
            template: "{{invoiceNo}}: {{amount}} due".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_partial_payment_precedence() {
        let after_due = rule(ReminderTrigger::AfterDue, 1, None);
        let partial = rule(ReminderTrigger::PartialPayment, 1, None);
        let rules = vec![after_due.clone(), partial.clone()];

        // Paid amount zero: partial-payment rule cannot match.
        let unpaid = snapshot(10, dec!(0));
        assert_eq!(select_rule(&unpaid, &rules, today()).unwrap().id, after_due.id);

        // Nonzero paid amount: partial-payment rule outranks after-due.
        let part_paid = snapshot(10, dec!(1000));
        assert_eq!(select_rule(&part_paid, &rules, today()).unwrap().id, partial.id);
    }

    #[test]
    fn test_campus_scoped_rule_outranks_org_wide() {
        let snap = snapshot(10, dec!(0));
        let org_wide = rule(ReminderTrigger::AfterDue, 1, None);
        let mut campus_rule = rule(ReminderTrigger::AfterDue, 1, None);
        campus_rule.campus_id = Some(snap.campus_id);

        let rules = vec![org_wide, campus_rule.clone()];
        assert_eq!(select_rule(&snap, &rules, today()).unwrap().id, campus_rule.id);

        // A rule scoped to another campus never matches.
        let mut foreign = rule(ReminderTrigger::AfterDue, 1, None);
        foreign.campus_id = Some(CampusId::new());
        assert!(select_rule(&snap, &[foreign], today()).is_none());
    }

    #[test]
    fn test_plan_renders_messages() {
        let rules = vec![rule(ReminderTrigger::AfterDue, 1, None)];
        let snap = snapshot(10, dec!(2000));

        let outcome = plan_run(
            std::slice::from_ref(&snap),
            &rules,
            &HashMap::new(),
            &LastSentIndex::new(),
            today(),
            None,
        );

        assert_eq!(outcome.planned.len(), 1);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(
            outcome.planned[0].message,
            "FP-202608-aaaaaaaa-bbbbbbbb: 3000 due"
        );
    }

    #[test]
    fn test_resend_interval_skips_recent_pairs() {
        let after_due = rule(ReminderTrigger::AfterDue, 1, None);
        let snap = snapshot(10, dec!(0));

        let mut last_sent = LastSentIndex::new();
        last_sent.insert(
            (snap.student_id, after_due.id),
            today() - chrono::Duration::days(3),
        );

        let outcome = plan_run(
            std::slice::from_ref(&snap),
            std::slice::from_ref(&after_due),
            &HashMap::new(),
            &last_sent,
            today(),
            None,
        );
        assert!(outcome.planned.is_empty());
        assert_eq!(outcome.skipped, 1);

        // Old enough: the pair is eligible again.
        last_sent.insert(
            (snap.student_id, after_due.id),
            today() - chrono::Duration::days(8),
        );
        let outcome = plan_run(
            std::slice::from_ref(&snap),
            std::slice::from_ref(&after_due),
            &HashMap::new(),
            &last_sent,
            today(),
            None,
        );
        assert_eq!(outcome.planned.len(), 1);
    }

    #[test]
    fn test_same_run_dedupe_per_student_and_rule() {
        let after_due = rule(ReminderTrigger::AfterDue, 1, None);
        let mut first = snapshot(10, dec!(0));
        let mut second = snapshot(40, dec!(0));
        let shared_student = StudentId::new();
        first.student_id = shared_student;
        second.student_id = shared_student;

        let outcome = plan_run(
            &[first, second],
            std::slice::from_ref(&after_due),
            &HashMap::new(),
            &LastSentIndex::new(),
            today(),
            None,
        );

        // Both invoices match the same rule for the same student; only the
        // first produces a reminder.
        assert_eq!(outcome.planned.len(), 1);
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn test_unmatched_invoices_are_skipped() {
        let final_notice = rule(ReminderTrigger::FinalNotice, 60, None);
        let snap = snapshot(10, dec!(0));

        let outcome = plan_run(
            std::slice::from_ref(&snap),
            std::slice::from_ref(&final_notice),
            &HashMap::new(),
            &LastSentIndex::new(),
            today(),
            None,
        );
        assert!(outcome.planned.is_empty());
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn test_before_due_planning() {
        let mut before = rule(ReminderTrigger::BeforeDue, 0, None);
        before.days_before = Some(3);
        let snap = snapshot(-3, dec!(0));

        let outcome = plan_run(
            std::slice::from_ref(&snap),
            std::slice::from_ref(&before),
            &HashMap::new(),
            &LastSentIndex::new(),
            today(),
            None,
        );
        assert_eq!(outcome.planned.len(), 1);
        assert_eq!(outcome.planned[0].trigger, ReminderTrigger::BeforeDue);
    }
}
