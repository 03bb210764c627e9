//! `SeaORM` Entity for the invoices (challans) table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{
    BankAccountId, BillingPeriod, BillingRuleId, CampusId, InvoiceId, OrganizationId, StudentId,
};

use super::sea_orm_active_enums::InvoiceStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub campus_id: Uuid,
    pub student_id: Uuid,
    pub billing_rule_id: Uuid,
    pub invoice_no: String,
    pub month: i16,
    pub year: i32,
    pub due_date: Date,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: InvoiceStatus,
    pub bank_account_id: Option<Uuid>,
    /// The run that created the invoice; null for ad hoc issuance.
    pub posting_run_id: Option<Uuid>,
    pub paid_at: Option<DateTimeWithTimeZone>,
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
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Students,
    #[sea_orm(
        belongs_to = "super::billing_rules::Entity",
        from = "Column::BillingRuleId",
        to = "super::billing_rules::Column::Id"
    )]
    BillingRules,
    #[sea_orm(has_many = "super::payment_records::Entity")]
    PaymentRecords,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::payment_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for tahsil_core::invoice::Invoice {
    fn from(model: Model) -> Self {
        Self {
            id: InvoiceId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            campus_id: CampusId::from_uuid(model.campus_id),
            student_id: StudentId::from_uuid(model.student_id),
            invoice_no: model.invoice_no,
            due_date: model.due_date,
            total_amount: model.total_amount,
            paid_amount: model.paid_amount,
            status: model.status.into(),
            period: BillingPeriod {
                month: u8::try_from(model.month).unwrap_or(1),
                year: model.year,
            },
            billing_rule_id: BillingRuleId::from_uuid(model.billing_rule_id),
            bank_account_id: model.bank_account_id.map(BankAccountId::from_uuid),
            paid_at: model.paid_at.map(Into::into),
        }
    }
}
