//! Posting domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{
    BankAccountId, BillingPeriod, BillingRuleId, CampusId, OrganizationId, StudentId,
};

/// How often a billing rule recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingFrequency {
    /// Billed every month.
    Monthly,
    /// Billed every quarter.
    Quarterly,
    /// Billed once a year.
    Annual,
}

/// A recurring fee definition for a campus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRule {
    /// Rule ID.
    pub id: BillingRuleId,
    /// Owning organization.
    pub organization_id: OrganizationId,
    /// Campus the rule bills.
    pub campus_id: CampusId,
    /// Amount billed per occurrence.
    pub amount: Decimal,
    /// Recurrence.
    pub frequency: BillingFrequency,
    /// When set, only students of this grade are billed.
    pub applicable_grade: Option<String>,
    /// First month (1-12) the rule is in effect, if windowed.
    pub start_month: Option<u8>,
    /// Last month (1-12) the rule is in effect, if windowed.
    pub end_month: Option<u8>,
    /// Inactive rules never post.
    pub is_active: bool,
}

impl BillingRule {
    /// Whether the rule's month window covers the given month.
    ///
    /// A window where start > end wraps the year boundary (e.g. Sep-Mar).
    #[must_use]
    pub fn covers_month(&self, month: u8) -> bool {
        match (self.start_month, self.end_month) {
            (None, None) => true,
            (Some(start), None) => month >= start,
            (None, Some(end)) => month <= end,
            (Some(start), Some(end)) => {
                if start <= end {
                    (start..=end).contains(&month)
                } else {
                    month >= start || month <= end
                }
            }
        }
    }

    /// Whether the rule applies to a student of the given grade.
    #[must_use]
    pub fn applies_to_grade(&self, grade: Option<&str>) -> bool {
        match &self.applicable_grade {
            None => true,
            Some(required) => grade == Some(required.as_str()),
        }
    }
}

/// The student fields posting needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSnapshot {
    /// The student.
    pub student_id: StudentId,
    /// The student's campus.
    pub campus_id: CampusId,
    /// Grade, when assigned.
    pub grade: Option<String>,
}

/// One invoice the plan wants created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceSeed {
    /// Billed student.
    pub student_id: StudentId,
    /// The student's campus.
    pub campus_id: CampusId,
    /// Rule that produced the seed.
    pub billing_rule_id: BillingRuleId,
    /// Deterministic invoice number.
    pub invoice_no: String,
    /// Amount to bill.
    pub amount: Decimal,
    /// Payment deadline.
    pub due_date: NaiveDate,
    /// Routed bank account, when routing resolved one for the campus.
    pub bank_account_id: Option<BankAccountId>,
    /// Period the invoice covers.
    pub period: BillingPeriod,
}

/// The full output of posting planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingPlan {
    /// Period being posted.
    pub period: BillingPeriod,
    /// Invoices to create, before per-invoice dedupe at execution time.
    pub seeds: Vec<InvoiceSeed>,
    /// Distinct students in the plan.
    pub total_students: usize,
    /// Sum of seed amounts.
    pub total_amount: Decimal,
}

/// Lifecycle of a posting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostingRunStatus {
    /// The run is executing.
    Processing,
    /// Every chunk committed.
    Completed,
    /// A chunk failed; committed chunks stand and a retry is safe.
    Failed,
}
