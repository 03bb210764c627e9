//! `SeaORM` Entity for the materialized student_balance_summaries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::StudentId;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "student_balance_summaries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: Uuid,
    pub organization_id: Uuid,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub balance: Decimal,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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

impl From<Model> for tahsil_core::ledger::BalanceSummary {
    fn from(model: Model) -> Self {
        Self {
            student_id: StudentId::from_uuid(model.student_id),
            total_debit: model.total_debit,
            total_credit: model.total_credit,
            balance: model.balance,
        }
    }
}
