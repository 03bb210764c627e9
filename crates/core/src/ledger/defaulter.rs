//! Defaulter detection, filtering, sorting, and pagination.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{CampusId, StudentId};

use super::aging::OutstandingInvoice;

/// Minimum-days-overdue cutoffs selectable as a defaulter filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverdueBucket {
    /// At least 1 day overdue.
    D30,
    /// At least 31 days overdue.
    D60,
    /// At least 61 days overdue.
    D90,
    /// At least 91 days overdue.
    D90Plus,
}

impl OverdueBucket {
    /// Minimum days overdue an invoice must reach to count for this bucket.
    #[must_use]
    pub const fn min_days(self) -> i64 {
        match self {
            Self::D30 => 1,
            Self::D60 => 31,
            Self::D90 => 61,
            Self::D90Plus => 91,
        }
    }
}

/// Sort key for defaulter listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefaulterSort {
    /// By outstanding overdue amount.
    #[default]
    Balance,
    /// By the most overdue invoice's age.
    DaysOverdue,
    /// By student name.
    Name,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

/// Filter, sort, and pagination parameters for defaulter detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaulterQuery {
    /// Only count invoices at least this overdue.
    pub bucket: Option<OverdueBucket>,
    /// Only include students whose overdue amount reaches this floor.
    pub min_amount: Option<Decimal>,
    /// Sort key.
    pub sort: DefaulterSort,
    /// Sort direction.
    pub order: SortOrder,
    /// Rows to skip.
    pub offset: usize,
    /// Maximum rows to return (0 means no limit).
    pub limit: usize,
}

/// Per-student input to defaulter detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaulterCandidate {
    /// The student.
    pub student_id: StudentId,
    /// Student display name.
    pub name: String,
    /// Admission number, if assigned.
    pub admission_no: Option<String>,
    /// The student's campus.
    pub campus_id: CampusId,
    /// The materialized summary balance for the student.
    pub summary_balance: Decimal,
    /// The student's unsettled invoices.
    pub invoices: Vec<OutstandingInvoice>,
}

/// One detected defaulter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaulter {
    /// The student.
    pub student_id: StudentId,
    /// Student display name.
    pub name: String,
    /// Admission number, if assigned.
    pub admission_no: Option<String>,
    /// The student's campus.
    pub campus_id: CampusId,
    /// Sum of overdue outstanding amounts (within the bucket filter).
    pub overdue_amount: Decimal,
    /// Age of the most overdue qualifying invoice.
    pub max_days_overdue: i64,
    /// Number of qualifying overdue invoices.
    pub invoice_count: usize,
    /// The materialized summary balance.
    pub summary_balance: Decimal,
}

/// A page of defaulters plus the pre-pagination total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaulterPage {
    /// Matching students before offset/limit.
    pub total: usize,
    /// The requested page.
    pub items: Vec<Defaulter>,
}

/// Detects defaulters among `candidates` as of `today`.
///
/// A student qualifies only when both the aggregated overdue outstanding is
/// positive and the materialized summary balance is positive; the latter
/// guards against stale overdue rows that are otherwise covered.
#[must_use]
pub fn find_defaulters(
    candidates: &[DefaulterCandidate],
    query: &DefaulterQuery,
    today: NaiveDate,
) -> DefaulterPage {
    let min_days = query.bucket.map_or(1, OverdueBucket::min_days);

    let mut matched: Vec<Defaulter> = candidates
        .iter()
        .filter_map(|candidate| {
            let mut overdue_amount = Decimal::ZERO;
            let mut max_days_overdue = 0i64;
            let mut invoice_count = 0usize;

            for invoice in &candidate.invoices {
                let days_overdue = (today - invoice.due_date).num_days();
                if days_overdue < min_days || invoice.outstanding <= Decimal::ZERO {
                    continue;
                }
                overdue_amount += invoice.outstanding;
                max_days_overdue = max_days_overdue.max(days_overdue);
                invoice_count += 1;
            }

            if overdue_amount <= Decimal::ZERO || candidate.summary_balance <= Decimal::ZERO {
                return None;
            }
            if let Some(floor) = query.min_amount
                && overdue_amount < floor
            {
                return None;
            }

            Some(Defaulter {
                student_id: candidate.student_id,
                name: candidate.name.clone(),
                admission_no: candidate.admission_no.clone(),
                campus_id: candidate.campus_id,
                overdue_amount,
                max_days_overdue,
                invoice_count,
                summary_balance: candidate.summary_balance,
            })
        })
        .collect();

    matched.sort_by(|a, b| {
        let ordering = match query.sort {
            DefaulterSort::Balance => a.overdue_amount.cmp(&b.overdue_amount),
            DefaulterSort::DaysOverdue => a.max_days_overdue.cmp(&b.max_days_overdue),
            DefaulterSort::Name => a.name.cmp(&b.name),
        };
        match query.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let total = matched.len();
    let items: Vec<Defaulter> = matched
        .into_iter()
        .skip(query.offset)
        .take(if query.limit == 0 {
            usize::MAX
        } else {
            query.limit
        })
        .collect();

    DefaulterPage { total, items }
}
