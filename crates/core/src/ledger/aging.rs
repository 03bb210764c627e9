//! Aging buckets and risk classification.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{InvoiceId, StudentId};

/// An invoice row with outstanding balance, as consumed by aging and
/// defaulter detection. Cancelled and fully paid invoices never reach here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutstandingInvoice {
    /// The invoice.
    pub invoice_id: InvoiceId,
    /// The billed student.
    pub student_id: StudentId,
    /// Remaining amount owed (positive).
    pub outstanding: Decimal,
    /// Payment deadline.
    pub due_date: NaiveDate,
}

/// Outstanding amounts classified by days overdue.
///
/// Boundaries are inclusive on the upper edge: exactly 30 days overdue lands
/// in `days_1_30`, exactly 90 in `days_61_90`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingSnapshot {
    /// Not yet due (days overdue <= 0).
    pub current: Decimal,
    /// 1-30 days overdue.
    pub days_1_30: Decimal,
    /// 31-60 days overdue.
    pub days_31_60: Decimal,
    /// 61-90 days overdue.
    pub days_61_90: Decimal,
    /// More than 90 days overdue.
    pub over_90: Decimal,
}

impl AgingSnapshot {
    /// Total outstanding across all buckets.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.current + self.days_1_30 + self.days_31_60 + self.days_61_90 + self.over_90
    }

    /// Total overdue outstanding (everything past due).
    #[must_use]
    pub fn overdue_total(&self) -> Decimal {
        self.days_1_30 + self.days_31_60 + self.days_61_90 + self.over_90
    }

    /// Adds an outstanding amount into the bucket for `days_overdue`.
    pub fn add(&mut self, days_overdue: i64, amount: Decimal) {
        match days_overdue {
            i64::MIN..=0 => self.current += amount,
            1..=30 => self.days_1_30 += amount,
            31..=60 => self.days_31_60 += amount,
            61..=90 => self.days_61_90 += amount,
            _ => self.over_90 += amount,
        }
    }
}

/// Risk level derived from an aging snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// Nothing overdue.
    Healthy,
    /// Some overdue outstanding.
    Moderate,
    /// More than 25% of outstanding is 31+ days overdue.
    High,
    /// More than 30% of outstanding is 90+ days overdue.
    Critical,
}

/// Classifies every outstanding invoice into exactly one bucket as of `today`.
#[must_use]
pub fn age_invoices(invoices: &[OutstandingInvoice], today: NaiveDate) -> AgingSnapshot {
    let mut snapshot = AgingSnapshot::default();
    for invoice in invoices {
        let days_overdue = (today - invoice.due_date).num_days();
        snapshot.add(days_overdue, invoice.outstanding);
    }
    snapshot
}

/// Derives the risk level from an aging snapshot.
///
/// Ratio comparisons are done with cross-multiplication so they stay exact
/// in `Decimal` arithmetic.
#[must_use]
pub fn assess_risk(aging: &AgingSnapshot) -> RiskLevel {
    let total = aging.total();
    if total <= Decimal::ZERO {
        return RiskLevel::Healthy;
    }

    // over_90 / total > 30%
    if aging.over_90 * Decimal::from(10) > total * Decimal::from(3) {
        return RiskLevel::Critical;
    }

    // (31-60 + 61-90 + over_90) / total > 25%
    let late = aging.days_31_60 + aging.days_61_90 + aging.over_90;
    if late * Decimal::from(4) > total {
        return RiskLevel::High;
    }

    if aging.overdue_total() > Decimal::ZERO {
        return RiskLevel::Moderate;
    }

    RiskLevel::Healthy
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn invoice(outstanding: Decimal, due_date: NaiveDate) -> OutstandingInvoice {
        OutstandingInvoice {
            invoice_id: InvoiceId::new(),
            student_id: StudentId::new(),
            outstanding,
            due_date,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[rstest]
    #[case(0, "current")]
    #[case(-5, "current")]
    #[case(1, "d1_30")]
    #[case(30, "d1_30")]
    #[case(31, "d31_60")]
    #[case(60, "d31_60")]
    #[case(61, "d61_90")]
    #[case(90, "d61_90")]
    #[case(91, "over_90")]
    #[case(400, "over_90")]
    fn test_bucket_boundaries(#[case] days_overdue: i64, #[case] expected: &str) {
        let mut snapshot = AgingSnapshot::default();
        snapshot.add(days_overdue, dec!(100));
        let hit = match expected {
            "current" => snapshot.current,
            "d1_30" => snapshot.days_1_30,
            "d31_60" => snapshot.days_31_60,
            "d61_90" => snapshot.days_61_90,
            "over_90" => snapshot.over_90,
            _ => unreachable!(),
        };
        assert_eq!(hit, dec!(100));
        assert_eq!(snapshot.total(), dec!(100));
    }

    #[test]
    fn test_age_invoices_sums_match_total() {
        let invoices = vec![
            invoice(dec!(1000), today() + chrono::Days::new(5)), // current
            invoice(dec!(2000), today() - chrono::Days::new(10)), // 1-30
            invoice(dec!(3000), today() - chrono::Days::new(45)), // 31-60
            invoice(dec!(500), today() - chrono::Days::new(120)), // over 90
        ];
        let snapshot = age_invoices(&invoices, today());
        assert_eq!(snapshot.current, dec!(1000));
        assert_eq!(snapshot.days_1_30, dec!(2000));
        assert_eq!(snapshot.days_31_60, dec!(3000));
        assert_eq!(snapshot.over_90, dec!(500));
        assert_eq!(snapshot.total(), dec!(6500));
    }

    #[test]
    fn test_risk_healthy_when_nothing_overdue() {
        let snapshot = AgingSnapshot {
            current: dec!(10000),
            ..AgingSnapshot::default()
        };
        assert_eq!(assess_risk(&snapshot), RiskLevel::Healthy);
        assert_eq!(assess_risk(&AgingSnapshot::default()), RiskLevel::Healthy);
    }

    #[test]
    fn test_risk_moderate_on_any_overdue() {
        let snapshot = AgingSnapshot {
            current: dec!(9900),
            days_1_30: dec!(100),
            ..AgingSnapshot::default()
        };
        assert_eq!(assess_risk(&snapshot), RiskLevel::Moderate);
    }

    #[test]
    fn test_risk_high_above_quarter_late() {
        // 26% of outstanding is 31+ days overdue.
        let snapshot = AgingSnapshot {
            current: dec!(7400),
            days_31_60: dec!(2600),
            ..AgingSnapshot::default()
        };
        assert_eq!(assess_risk(&snapshot), RiskLevel::High);
    }

    #[test]
    fn test_risk_critical_above_thirty_percent_ancient() {
        let snapshot = AgingSnapshot {
            current: dec!(6900),
            over_90: dec!(3100),
            ..AgingSnapshot::default()
        };
        assert_eq!(assess_risk(&snapshot), RiskLevel::Critical);
    }

    #[test]
    fn test_risk_boundaries_are_strict() {
        // Exactly 30% over-90 is High (via the 25% test), not Critical.
        let snapshot = AgingSnapshot {
            current: dec!(7000),
            over_90: dec!(3000),
            ..AgingSnapshot::default()
        };
        assert_eq!(assess_risk(&snapshot), RiskLevel::High);

        // Exactly 25% late is Moderate, not High.
        let snapshot = AgingSnapshot {
            current: dec!(7500),
            days_61_90: dec!(2500),
            ..AgingSnapshot::default()
        };
        assert_eq!(assess_risk(&snapshot), RiskLevel::Moderate);
    }
}
