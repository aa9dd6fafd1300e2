use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of email body a message template produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text", enum_name = "message_template_type_enum")]
#[serde(rename_all = "lowercase")]
pub enum MessageTemplateType {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "html")]
    Html,
}

impl MessageTemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageTemplateType::Text => "text",
            MessageTemplateType::Html => "html",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(MessageTemplateType::Text),
            "html" => Some(MessageTemplateType::Html),
            _ => None,
        }
    }
}

impl fmt::Display for MessageTemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
