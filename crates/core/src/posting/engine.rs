//! Pure posting plan computation.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tahsil_shared::types::{BillingPeriod, CampusId};

use crate::invoice::invoice_number;
use crate::routing::{RoutedAccount, RoutingError};

use super::error::PostingError;
use super::types::{BillingFrequency, BillingRule, InvoiceSeed, PostingPlan, StudentSnapshot};

/// Inputs to a posting plan.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// Period to bill.
    pub period: BillingPeriod,
    /// When set, only this campus is posted.
    pub campus_id: Option<CampusId>,
    /// Caller-supplied due date; defaults to the configured day of the
    /// period month when absent.
    pub due_date_override: Option<NaiveDate>,
    /// Day of month used for the default due date.
    pub due_day_of_month: u32,
}

/// Plans posting runs. Pure: selection, crossing, numbering, and routing
/// attribution happen in memory; the repository executes the result.
pub struct PostingEngine;

impl PostingEngine {
    /// Builds the posting plan for a period.
    ///
    /// Selects active monthly rules in scope whose month window covers the
    /// period, crosses them with the students of their campus honoring grade
    /// applicability, and emits one [`InvoiceSeed`] per (student, rule) pair.
    /// Per-invoice dedupe against existing invoices happens at execution
    /// time, keeping a retried run safe.
    ///
    /// Routing attribution is best-effort: a campus whose routing failed
    /// still posts, with no bank account on its seeds.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::NoEligibleRules`] when no rule survives the
    /// filters.
    pub fn plan(
        request: &PostingRequest,
        rules: &[BillingRule],
        students: &[StudentSnapshot],
        routed: &HashMap<CampusId, Result<RoutedAccount, RoutingError>>,
    ) -> Result<PostingPlan, PostingError> {
        let period = request.period;

        let eligible: Vec<&BillingRule> = rules
            .iter()
            .filter(|rule| {
                rule.is_active
                    && rule.frequency == BillingFrequency::Monthly
                    && request.campus_id.is_none_or(|campus| rule.campus_id == campus)
                    && rule.covers_month(period.month)
            })
            .collect();

        if eligible.is_empty() {
            return Err(PostingError::NoEligibleRules { period });
        }

        let mut students_by_campus: HashMap<CampusId, Vec<&StudentSnapshot>> = HashMap::new();
        for student in students {
            students_by_campus
                .entry(student.campus_id)
                .or_default()
                .push(student);
        }

        let due_date = request
            .due_date_override
            .unwrap_or_else(|| period.due_date(request.due_day_of_month));

        let mut seeds = Vec::new();
        let mut billed_students = HashSet::new();
        let mut total_amount = Decimal::ZERO;

        for rule in eligible {
            let Some(campus_students) = students_by_campus.get(&rule.campus_id) else {
                continue;
            };
            let bank_account_id = routed
                .get(&rule.campus_id)
                .and_then(|result| result.as_ref().ok())
                .map(|account| account.bank_account_id);

            for student in campus_students {
                if !rule.applies_to_grade(student.grade.as_deref()) {
                    continue;
                }
                billed_students.insert(student.student_id);
                total_amount += rule.amount;
                seeds.push(InvoiceSeed {
                    student_id: student.student_id,
                    campus_id: student.campus_id,
                    billing_rule_id: rule.id,
                    invoice_no: invoice_number(period, student.student_id, rule.id),
                    amount: rule.amount,
                    due_date,
                    bank_account_id,
                    period,
                });
            }
        }

        Ok(PostingPlan {
            period,
            total_students: billed_students.len(),
            total_amount,
            seeds,
        })
    }
}
