//! Collection rate metrics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::BillingPeriod;

/// Collection performance for one billing period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMetrics {
    /// The measured period.
    pub period: BillingPeriod,
    /// Debit ledger amount posted inside the period window.
    pub billed: Decimal,
    /// Credit ledger amount posted inside the period window.
    pub collected: Decimal,
    /// `collected / billed` as a percentage, 0 when nothing was billed.
    pub rate: Decimal,
}

impl CollectionMetrics {
    /// Builds the metrics for a period from its ledger sums.
    #[must_use]
    pub fn new(period: BillingPeriod, billed: Decimal, collected: Decimal) -> Self {
        Self {
            period,
            billed,
            collected,
            rate: collection_rate(billed, collected),
        }
    }
}

/// Collection rate as a percentage: credit-sum over debit-sum.
///
/// Returns zero when no debits were posted in the window.
#[must_use]
pub fn collection_rate(billed: Decimal, collected: Decimal) -> Decimal {
    if billed <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (collected * Decimal::ONE_HUNDRED) / billed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rate_is_percentage() {
        assert_eq!(collection_rate(dec!(10000), dec!(7500)), dec!(75));
        assert_eq!(collection_rate(dec!(10000), dec!(10000)), dec!(100));
    }

    #[test]
    fn test_zero_billed_is_zero_rate() {
        assert_eq!(collection_rate(dec!(0), dec!(5000)), dec!(0));
    }

    #[test]
    fn test_metrics_constructor() {
        let period = BillingPeriod::new(2026, 8).unwrap();
        let metrics = CollectionMetrics::new(period, dec!(8000), dec!(2000));
        assert_eq!(metrics.rate, dec!(25));
    }
}
