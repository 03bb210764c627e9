//! Property tests for aging classification.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tahsil_shared::types::{InvoiceId, StudentId};

use super::aging::{OutstandingInvoice, RiskLevel, age_invoices, assess_risk};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 30).unwrap_or_default()
}

fn invoice_strategy() -> impl Strategy<Value = OutstandingInvoice> {
    (1i64..5_000_000i64, -120i64..500i64).prop_map(|(cents, days_overdue)| {
        OutstandingInvoice {
            invoice_id: InvoiceId::new(),
            student_id: StudentId::new(),
            outstanding: Decimal::new(cents, 2),
            due_date: today() - chrono::Duration::days(days_overdue),
        }
    })
}

fn invoices_strategy(max_len: usize) -> impl Strategy<Value = Vec<OutstandingInvoice>> {
    prop::collection::vec(invoice_strategy(), 0..=max_len)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Bucket sums always equal the sum of the classified outstanding
    /// amounts: no amount is dropped or double-counted.
    #[test]
    fn prop_bucket_sums_equal_total(invoices in invoices_strategy(40)) {
        let snapshot = age_invoices(&invoices, today());
        let expected: Decimal = invoices.iter().map(|i| i.outstanding).sum();
        prop_assert_eq!(snapshot.total(), expected);
    }

    /// Classification is additive: aging two invoice sets separately and
    /// summing the snapshots equals aging the concatenation.
    #[test]
    fn prop_aging_is_additive(
        first in invoices_strategy(20),
        second in invoices_strategy(20),
    ) {
        let a = age_invoices(&first, today());
        let b = age_invoices(&second, today());

        let mut combined: Vec<OutstandingInvoice> = first;
        combined.extend(second);
        let whole = age_invoices(&combined, today());

        prop_assert_eq!(whole.current, a.current + b.current);
        prop_assert_eq!(whole.days_1_30, a.days_1_30 + b.days_1_30);
        prop_assert_eq!(whole.days_31_60, a.days_31_60 + b.days_31_60);
        prop_assert_eq!(whole.days_61_90, a.days_61_90 + b.days_61_90);
        prop_assert_eq!(whole.over_90, a.over_90 + b.over_90);
    }

    /// Risk is Healthy exactly when nothing is overdue.
    #[test]
    fn prop_healthy_iff_no_overdue(invoices in invoices_strategy(40)) {
        let snapshot = age_invoices(&invoices, today());
        let risk = assess_risk(&snapshot);
        prop_assert_eq!(
            risk == RiskLevel::Healthy,
            snapshot.overdue_total() == Decimal::ZERO
        );
    }

    /// Adding current (not overdue) outstanding never raises the risk level.
    #[test]
    fn prop_current_amount_never_raises_risk(
        invoices in invoices_strategy(30),
        extra_cents in 1i64..5_000_000i64,
    ) {
        let base = age_invoices(&invoices, today());
        let before = assess_risk(&base);

        let mut diluted = base;
        diluted.add(0, Decimal::new(extra_cents, 2));
        let after = assess_risk(&diluted);

        prop_assert!(after <= before);
    }
}
