//! `SeaORM` Entity for the billing_rules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{BillingRuleId, CampusId, OrganizationId};

use super::sea_orm_active_enums::BillingFrequency;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "billing_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub campus_id: Uuid,
    pub amount: Decimal,
    pub frequency: BillingFrequency,
    pub applicable_grade: Option<String>,
    pub start_month: Option<i16>,
    pub end_month: Option<i16>,
    pub is_active: bool,
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
        belongs_to = "super::campuses::Entity",
        from = "Column::CampusId",
        to = "super::campuses::Column::Id"
    )]
    Campuses,
}

impl Related<super::campuses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Campuses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for tahsil_core::posting::BillingRule {
    fn from(model: Model) -> Self {
        Self {
            id: BillingRuleId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            campus_id: CampusId::from_uuid(model.campus_id),
            amount: model.amount,
            frequency: model.frequency.into(),
            applicable_grade: model.applicable_grade,
            start_month: model.start_month.and_then(|m| u8::try_from(m).ok()),
            end_month: model.end_month.and_then(|m| u8::try_from(m).ok()),
            is_active: model.is_active,
        }
    }
}
