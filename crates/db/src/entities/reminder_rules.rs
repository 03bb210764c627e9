//! `SeaORM` Entity for the reminder_rules table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tahsil_shared::types::{CampusId, OrganizationId, ReminderRuleId};

use super::sea_orm_active_enums::{ReminderChannel, ReminderTrigger};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reminder_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    /// Null means the rule applies organization-wide.
    pub campus_id: Option<Uuid>,
    pub name: String,
    pub trigger: ReminderTrigger,
    pub days_before: Option<i32>,
    pub min_days_overdue: i32,
    pub max_days_overdue: Option<i32>,
    pub channel: ReminderChannel,
    pub frequency_days: i32,
    #[sea_orm(column_type = "Text")]
    pub template: String,
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
    #[sea_orm(has_many = "super::reminder_logs::Entity")]
    ReminderLogs,
}

impl Related<super::reminder_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReminderLogs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for tahsil_core::reminder::ReminderRule {
    fn from(model: Model) -> Self {
        Self {
            id: ReminderRuleId::from_uuid(model.id),
            organization_id: OrganizationId::from_uuid(model.organization_id),
            campus_id: model.campus_id.map(CampusId::from_uuid),
            name: model.name,
            trigger: model.trigger.into(),
            days_before: model.days_before.map(i64::from),
            min_days_overdue: i64::from(model.min_days_overdue),
            max_days_overdue: model.max_days_overdue.map(i64::from),
            channel: model.channel.into(),
            frequency_days: i64::from(model.frequency_days),
            template: model.template,
            is_active: model.is_active,
        }
    }
}
