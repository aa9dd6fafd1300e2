use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::MessageTemplateType;
use crate::services::template_params;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: i32,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub kind: MessageTemplateType,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

impl Model {
    /// Placeholder names used by the current body. Computed on every call.
    pub fn body_parameters(&self) -> Vec<String> {
        template_params::extract_parameters(&self.body)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade",
        on_update = "Cascade"
    )]
    Account,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::message_template_tag::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::message_template_tag::Relation::MessageTemplate.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
