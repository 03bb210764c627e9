//! `SeaORM` Entity for the payment_records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{BankAccountId, InvoiceId, OrganizationId, PaymentRecordId};

use super::sea_orm_active_enums::{PaymentChannel, PaymentStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub bank_account_id: Option<Uuid>,
    pub amount: Decimal,
    pub currency: String,
    pub channel: PaymentChannel,
    pub status: PaymentStatus,
    pub transaction_ref: Option<String>,
    /// Deterministic duplicate-submission guard; unique among
    /// Pending/Reconciled records of an organization.
    pub idempotency_key: Option<String>,
    pub paid_at: DateTimeWithTimeZone,
    pub failure_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for tahsil_core::reconciliation::PaymentRecord {
    fn from(model: Model) -> Self {
        Self {
            id: PaymentRecordId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            invoice_id: model.invoice_id.map(InvoiceId::from_uuid),
            bank_account_id: model.bank_account_id.map(BankAccountId::from_uuid),
            amount: model.amount,
            currency: model.currency,
            channel: model.channel.into(),
            status: model.status.into(),
            transaction_ref: model.transaction_ref,
            idempotency_key: model.idempotency_key,
            paid_at: model.paid_at.into(),
            failure_reason: model.failure_reason,
        }
    }
}
