//! Billing period (month + year) arithmetic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A billing period: one calendar month of one year.
///
/// Invoices, posting runs, and collection metrics are all keyed by period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BillingPeriod {
    /// Calendar month, 1-12.
    pub month: u8,
    /// Calendar year.
    pub year: i32,
}

impl BillingPeriod {
    /// Creates a period, validating the month.
    ///
    /// Returns `None` if `month` is outside 1-12.
    #[must_use]
    pub fn new(year: i32, month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { month, year })
    }

    /// First day of the period.
    ///
    /// # Panics
    ///
    /// Never panics for a period constructed through [`Self::new`].
    #[must_use]
    pub fn start_date(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), 1)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(self.year, 1, 1).unwrap_or_default())
    }

    /// Last day of the period.
    #[must_use]
    pub fn end_date(self) -> NaiveDate {
        self.next()
            .start_date()
            .pred_opt()
            .unwrap_or_else(|| self.start_date())
    }

    /// The following period, rolling over the year boundary.
    #[must_use]
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                month: 1,
                year: self.year + 1,
            }
        } else {
            Self {
                month: self.month + 1,
                year: self.year,
            }
        }
    }

    /// The preceding period, rolling over the year boundary.
    #[must_use]
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                month: 12,
                year: self.year - 1,
            }
        } else {
            Self {
                month: self.month - 1,
                year: self.year,
            }
        }
    }

    /// Default due date for the period: the given day of the period's month,
    /// clamped to the period's last day.
    #[must_use]
    pub fn due_date(self, day_of_month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, u32::from(self.month), day_of_month)
            .unwrap_or_else(|| self.end_date())
    }
}

impl std::fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_new_rejects_bad_month() {
        assert!(BillingPeriod::new(2026, 0).is_none());
        assert!(BillingPeriod::new(2026, 13).is_none());
        assert!(BillingPeriod::new(2026, 6).is_some());
    }

    #[rstest]
    #[case(2026, 1, 31)]
    #[case(2026, 2, 28)]
    #[case(2028, 2, 29)]
    #[case(2026, 4, 30)]
    #[case(2026, 12, 31)]
    fn test_end_date(#[case] year: i32, #[case] month: u8, #[case] last_day: u32) {
        let period = BillingPeriod::new(year, month).unwrap();
        assert_eq!(
            period.end_date(),
            NaiveDate::from_ymd_opt(year, u32::from(month), last_day).unwrap()
        );
    }

    #[test]
    fn test_next_rolls_year() {
        let december = BillingPeriod::new(2026, 12).unwrap();
        assert_eq!(december.next(), BillingPeriod::new(2027, 1).unwrap());
    }

    #[test]
    fn test_previous_rolls_year() {
        let january = BillingPeriod::new(2026, 1).unwrap();
        assert_eq!(january.previous(), BillingPeriod::new(2025, 12).unwrap());
    }

    #[test]
    fn test_due_date_clamps_to_month_end() {
        let february = BillingPeriod::new(2026, 2).unwrap();
        assert_eq!(
            february.due_date(31),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
        assert_eq!(
            february.due_date(10),
            NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
        );
    }

    #[test]
    fn test_display_zero_pads_month() {
        assert_eq!(BillingPeriod::new(2026, 3).unwrap().to_string(), "2026-03");
    }
}
