//! `SeaORM` Entity for the reminder_logs table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ReminderChannel, ReminderLogStatus, ReminderTrigger};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reminder_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub student_id: Uuid,
    pub invoice_id: Uuid,
    pub reminder_rule_id: Uuid,
    pub trigger: ReminderTrigger,
    pub channel: ReminderChannel,
    pub status: ReminderLogStatus,
    #[sea_orm(column_type = "Text")]
    pub message_body: String,
    pub error_detail: Option<String>,
    pub sent_at: DateTimeWithTimeZone,
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
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id"
    )]
    Invoices,
    #[sea_orm(
        belongs_to = "super::reminder_rules::Entity",
        from = "Column::ReminderRuleId",
        to = "super::reminder_rules::Column::Id"
    )]
    ReminderRules,
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Students.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::reminder_rules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReminderRules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
