//! Shared ledger append helper.
//!
//! Every money-moving repository funnels its ledger writes through here so
//! the append-only entry and the materialized balance summary always change
//! inside the same database transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveModelTrait, DatabaseTransaction, DbErr, EntityTrait, Set};
use tahsil_core::ledger::{BalanceSummary, EntryDirection, LedgerEntrySeed};
use tahsil_shared::types::{LedgerEntryId, StudentId};
use uuid::Uuid;

use crate::entities::{ledger_entries, student_balance_summaries};

/// Appends a ledger entry and folds it into the student's balance summary.
///
/// Must run inside the transaction that carries the rest of the unit of work
/// (invoice update, payment update); committing the entry without the
/// projection would break the summary invariant.
pub(crate) async fn append_entry(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    seed: &LedgerEntrySeed,
    entry_date: DateTime<Utc>,
) -> Result<ledger_entries::Model, DbErr> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let (reference_kind, reference_id) = ledger_entries::encode_reference(seed.reference);

    let entry = ledger_entries::ActiveModel {
        id: Set(LedgerEntryId::new().into_inner()),
        organization_id: Set(organization_id),
        student_id: Set(seed.student_id.into_inner()),
        direction: Set(seed.direction.into()),
        kind: Set(seed.kind.into()),
        amount: Set(seed.amount),
        reference_kind: Set(reference_kind),
        reference_id: Set(reference_id),
        entry_date: Set(entry_date.into()),
        note: Set(seed.note.clone()),
        created_at: Set(now),
    }
    .insert(txn)
    .await?;

    apply_to_summary(txn, organization_id, seed).await?;

    Ok(entry)
}

/// Folds one entry into the summary row, creating the row on first write.
///
/// The totals are incremented in SQL, not computed from a read snapshot:
/// concurrent appends serialize on the row and no update can be lost.
async fn apply_to_summary(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    seed: &LedgerEntrySeed,
) -> Result<(), DbErr> {
    use student_balance_summaries::Column;

    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let (debit, credit) = match seed.direction {
        EntryDirection::Debit => (seed.amount, Decimal::ZERO),
        EntryDirection::Credit => (Decimal::ZERO, seed.amount),
    };
    let delta = debit - credit;

    student_balance_summaries::Entity::insert(student_balance_summaries::ActiveModel {
        student_id: Set(seed.student_id.into_inner()),
        organization_id: Set(organization_id),
        total_debit: Set(debit),
        total_credit: Set(credit),
        balance: Set(delta),
        updated_at: Set(now),
    })
    .on_conflict(
        OnConflict::column(Column::StudentId)
            .value(
                Column::TotalDebit,
                Expr::col((student_balance_summaries::Entity, Column::TotalDebit)).add(debit),
            )
            .value(
                Column::TotalCredit,
                Expr::col((student_balance_summaries::Entity, Column::TotalCredit)).add(credit),
            )
            .value(
                Column::Balance,
                Expr::col((student_balance_summaries::Entity, Column::Balance)).add(delta),
            )
            .value(Column::UpdatedAt, now)
            .to_owned(),
    )
    .exec(txn)
    .await?;

    Ok(())
}

/// Overwrites a summary row with a rescanned state, creating it when absent.
pub(crate) async fn store_summary(
    txn: &DatabaseTransaction,
    organization_id: Uuid,
    summary: &BalanceSummary,
) -> Result<(), DbErr> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let student_uuid = summary.student_id.into_inner();

    let existing = student_balance_summaries::Entity::find_by_id(student_uuid)
        .one(txn)
        .await?;

    match existing {
        Some(model) => {
            let mut active: student_balance_summaries::ActiveModel = model.into();
            active.total_debit = Set(summary.total_debit);
            active.total_credit = Set(summary.total_credit);
            active.balance = Set(summary.balance);
            active.updated_at = Set(now);
            active.update(txn).await?;
        }
        None => {
            student_balance_summaries::ActiveModel {
                student_id: Set(student_uuid),
                organization_id: Set(organization_id),
                total_debit: Set(summary.total_debit),
                total_credit: Set(summary.total_credit),
                balance: Set(summary.balance),
                updated_at: Set(now),
            }
            .insert(txn)
            .await?;
        }
    }

    Ok(())
}

/// Loads the summary for a student as core state, empty when no row exists.
pub(crate) async fn load_summary<C: sea_orm::ConnectionTrait>(
    conn: &C,
    student_id: StudentId,
) -> Result<BalanceSummary, DbErr> {
    let row = student_balance_summaries::Entity::find_by_id(student_id.into_inner())
        .one(conn)
        .await?;
    Ok(row.map_or_else(|| BalanceSummary::empty(student_id), BalanceSummary::from))
}
