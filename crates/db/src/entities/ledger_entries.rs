//! `SeaORM` Entity for the append-only ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{
    InvoiceId, LedgerEntryId, OrganizationId, PaymentRecordId, StudentId,
};

use super::sea_orm_active_enums::{EntryDirection, EntryKind, LedgerReferenceKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub student_id: Uuid,
    pub direction: EntryDirection,
    pub kind: EntryKind,
    pub amount: Decimal,
    /// Tagged reference: kind plus at most one target ID.
    pub reference_kind: LedgerReferenceKind,
    pub reference_id: Option<Uuid>,
    pub entry_date: DateTimeWithTimeZone,
    pub note: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organizations::Entity",
        from = "Column::OrganizationId",
        to = "super::organizations::Column::Id"
    )]
    Organizations,
    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Students,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decodes the tagged reference columns.
    #[must_use]
    pub fn reference(&self) -> tahsil_core::ledger::LedgerReference {
        match (&self.reference_kind, self.reference_id) {
            (LedgerReferenceKind::Invoice, Some(id)) => {
                tahsil_core::ledger::LedgerReference::Invoice(InvoiceId::from_uuid(id))
            }
            (LedgerReferenceKind::Payment, Some(id)) => {
                tahsil_core::ledger::LedgerReference::Payment(PaymentRecordId::from_uuid(id))
            }
            _ => tahsil_core::ledger::LedgerReference::None,
        }
    }
}

/// Encodes a tagged reference into its column pair.
#[must_use]
pub fn encode_reference(
    reference: tahsil_core::ledger::LedgerReference,
) -> (LedgerReferenceKind, Option<Uuid>) {
    match reference {
        tahsil_core::ledger::LedgerReference::Invoice(id) => {
            (LedgerReferenceKind::Invoice, Some(id.into_inner()))
        }
        tahsil_core::ledger::LedgerReference::Payment(id) => {
            (LedgerReferenceKind::Payment, Some(id.into_inner()))
        }
        tahsil_core::ledger::LedgerReference::None => (LedgerReferenceKind::None, None),
    }
}

impl From<Model> for tahsil_core::ledger::LedgerEntry {
    fn from(model: Model) -> Self {
        let reference = model.reference();
        Self {
            id: LedgerEntryId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            student_id: StudentId::from_uuid(model.student_id),
            direction: model.direction.into(),
            kind: model.kind.into(),
            amount: model.amount,
            reference,
            entry_date: model.entry_date.into(),
            note: model.note,
        }
    }
}
