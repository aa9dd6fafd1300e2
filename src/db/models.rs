use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::db::entities::{account, message_template, tag};
use crate::db::enums::MessageTemplateType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub account_id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<tag::Model> for Tag {
    fn from(model: tag::Model) -> Self {
        Tag {
            id: model.id,
            account_id: model.account_id,
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub id: Uuid,
    pub name: String,
}

/// A message template together with its tags and the values derived from
/// them. Built fresh from the stored row on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplateDetail {
    pub id: Uuid,
    pub account_id: i32,
    #[serde(rename = "type")]
    pub kind: MessageTemplateType,
    pub title: String,
    pub body: String,
    pub tags: Vec<TagSummary>,
    pub body_parameters: Vec<String>,
    pub tag_names: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MessageTemplateDetail {
    pub fn new(model: message_template::Model, mut tags: Vec<tag::Model>) -> Self {
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        let body_parameters = model.body_parameters();
        let tag_names = join_tag_names(&tags);
        MessageTemplateDetail {
            id: model.id,
            account_id: model.account_id,
            kind: model.kind,
            title: model.title,
            body: model.body,
            tags: tags
                .into_iter()
                .map(|t| TagSummary {
                    id: t.id,
                    name: t.name,
                })
                .collect(),
            body_parameters,
            tag_names,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl fmt::Display for MessageTemplateDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag_names.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} (tags={})", self.title, self.tag_names)
        }
    }
}

/// Tag names in ascending order joined with commas.
pub fn join_tag_names(tags: &[tag::Model]) -> String {
    let mut names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    names.sort_unstable();
    names.join(",")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: i32,
    pub email: String,
    pub nickname: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl From<account::Model> for AccountProfile {
    fn from(model: account::Model) -> Self {
        AccountProfile {
            id: model.id,
            email: model.email,
            nickname: model.nickname,
            is_staff: model.is_staff,
            created_at: model.created_at,
        }
    }
}
