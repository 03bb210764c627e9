//! Integration tests for the ledger repository.
//!
//! Covers the materialized balance projection, projection repair, statements,
//! adjustments, aging, and defaulter detection.

mod common;

use chrono::{Datelike, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use tahsil_core::ledger::{
    DefaulterQuery, EntryDirection, LedgerError, RiskLevel,
};
use tahsil_db::entities::student_balance_summaries;
use tahsil_db::repositories::{LedgerRepository, PostingRepository};
use tahsil_shared::types::BillingPeriod;

fn period() -> BillingPeriod {
    BillingPeriod::new(2026, 9).expect("valid period")
}

// ============================================================================
// Test: Adjustments flow through the projection
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_adjustment_updates_summary() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let repo = LedgerRepository::new(db.clone());

    // A student with no entries has an empty summary, not an error.
    let empty = repo
        .get_summary(&fx.scope, fx.student_id)
        .await
        .expect("empty summary");
    assert_eq!(empty.balance, Decimal::ZERO);

    repo.record_adjustment(
        &fx.scope,
        fx.student_id,
        EntryDirection::Debit,
        Decimal::new(200, 0),
        Some("late fee".to_string()),
    )
    .await
    .expect("debit adjustment");

    repo.record_adjustment(
        &fx.scope,
        fx.student_id,
        EntryDirection::Credit,
        Decimal::new(50, 0),
        Some("sibling discount".to_string()),
    )
    .await
    .expect("credit adjustment");

    let summary = repo
        .get_summary(&fx.scope, fx.student_id)
        .await
        .expect("summary");
    assert_eq!(summary.total_debit, Decimal::new(200, 0));
    assert_eq!(summary.total_credit, Decimal::new(50, 0));
    assert_eq!(summary.balance, Decimal::new(150, 0));

    let err = repo
        .record_adjustment(
            &fx.scope,
            fx.student_id,
            EntryDirection::Debit,
            Decimal::ZERO,
            None,
        )
        .await
        .expect_err("zero amount is rejected");
    assert!(matches!(err, LedgerError::NonPositiveAmount));
}

// ============================================================================
// Test: Repair rebuilds a drifted projection from the ledger
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_repair_fixes_drifted_summary() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let repo = LedgerRepository::new(db.clone());
    repo.record_adjustment(
        &fx.scope,
        fx.student_id,
        EntryDirection::Debit,
        Decimal::new(700, 0),
        None,
    )
    .await
    .expect("adjustment");

    // Corrupt the projection behind the repository's back.
    let row = student_balance_summaries::Entity::find_by_id(fx.student_id.into_inner())
        .one(&db)
        .await
        .expect("load summary row")
        .expect("summary row exists");
    let mut active: student_balance_summaries::ActiveModel = row.into();
    active.total_debit = Set(Decimal::new(9999, 0));
    active.balance = Set(Decimal::new(9999, 0));
    active.update(&db).await.expect("corrupt summary");

    let repaired = repo
        .repair_summary(&fx.scope, fx.student_id)
        .await
        .expect("repair");
    assert_eq!(repaired.total_debit, Decimal::new(700, 0));
    assert_eq!(repaired.balance, Decimal::new(700, 0));

    let read_back = repo
        .get_summary(&fx.scope, fx.student_id)
        .await
        .expect("summary after repair");
    assert_eq!(read_back.balance, Decimal::new(700, 0));
}

// ============================================================================
// Test: Statement opening balance nets everything before the range
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_statement_opening_and_running_balance() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let repo = LedgerRepository::new(db.clone());
    repo.record_adjustment(
        &fx.scope,
        fx.student_id,
        EntryDirection::Debit,
        Decimal::new(300, 0),
        None,
    )
    .await
    .expect("entry");

    let today = Utc::now().date_naive();

    // Range starting tomorrow: today's entry lands in the opening balance.
    let later = repo
        .statement(
            &fx.scope,
            fx.student_id,
            today + Duration::days(1),
            today + Duration::days(2),
        )
        .await
        .expect("statement after entries");
    assert_eq!(later.opening_balance, Decimal::new(300, 0));
    assert!(later.lines.is_empty());
    assert_eq!(later.closing_balance, Decimal::new(300, 0));

    // Range covering today: the entry is a line with a running balance.
    let covering = repo
        .statement(&fx.scope, fx.student_id, today, today)
        .await
        .expect("statement covering today");
    assert_eq!(covering.opening_balance, Decimal::ZERO);
    assert_eq!(covering.lines.len(), 1);
    assert_eq!(covering.lines[0].running_balance, Decimal::new(300, 0));
    assert_eq!(covering.closing_balance, Decimal::new(300, 0));

    let err = repo
        .statement(
            &fx.scope,
            fx.student_id,
            today,
            today - Duration::days(1),
        )
        .await
        .expect_err("inverted range is rejected");
    assert!(matches!(err, LedgerError::InvalidDateRange { .. }));
}

// ============================================================================
// Test: Aging buckets and defaulter detection over overdue invoices
// ============================================================================
#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_aging_and_defaulters() {
    let db = common::connect().await;
    let fx = common::seed(&db).await;

    let posting = PostingRepository::new(db.clone(), &common::finance());
    let today = Utc::now().date_naive();

    // An invoice 45 days overdue for a period safely in the past.
    let past = BillingPeriod::new(today.year() - 1, 1).expect("valid period");
    posting
        .issue_invoice(
            &fx.scope,
            fx.student_id,
            fx.rule_id,
            past,
            Some(today - Duration::days(45)),
        )
        .await
        .expect("overdue invoice");

    let repo = LedgerRepository::new(db.clone());
    let (snapshot, risk) = repo.aging(&fx.scope, today).await.expect("aging");
    assert_eq!(snapshot.days_31_60, Decimal::new(1500, 0));
    assert_eq!(snapshot.current, Decimal::ZERO);
    assert_ne!(risk, RiskLevel::Healthy);

    let page = repo
        .defaulters(&fx.scope, &DefaulterQuery::default(), today)
        .await
        .expect("defaulters");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].student_id, fx.student_id);

    // A floor above the overdue amount filters the student out.
    let strict = DefaulterQuery {
        min_amount: Some(Decimal::new(5000, 0)),
        ..DefaulterQuery::default()
    };
    let page = repo
        .defaulters(&fx.scope, &strict, today)
        .await
        .expect("defaulters with floor");
    assert_eq!(page.total, 0);
}
