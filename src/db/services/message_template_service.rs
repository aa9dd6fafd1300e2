use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::entities::{
    message_template, message_template_tag, prelude::MessageTemplateTag, tag,
};
use crate::db::enums::MessageTemplateType;
use crate::db::models::MessageTemplateDetail;
use crate::db::scope::{find_owned, owned_by};
use crate::services::template_params;
use crate::validation::FieldErrors;

#[derive(Debug, thiserror::Error)]
pub enum MessageTemplateError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Message template not found: {0}")]
    NotFound(Uuid),
    #[error("Invalid message template: {0}")]
    Invalid(FieldErrors),
}

#[derive(Debug, Clone)]
pub struct MessageTemplateInput {
    pub kind: MessageTemplateType,
    pub title: String,
    pub body: String,
    pub tag_ids: Vec<Uuid>,
}

pub struct MessageTemplateService;

impl MessageTemplateService {
    pub async fn create(
        db: &DbConn,
        account_id: i32,
        input: MessageTemplateInput,
    ) -> Result<MessageTemplateDetail, MessageTemplateError> {
        Self::check_body(&input.body)?;

        let txn = db.begin().await?;
        let tags = Self::resolve_tags(&txn, account_id, &input.tag_ids).await?;

        let now = Utc::now();
        let new_template = message_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            kind: Set(input.kind),
            title: Set(input.title),
            body: Set(input.body),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let template = new_template.insert(&txn).await?;
        Self::attach_tags(&txn, template.id, &tags).await?;
        txn.commit().await?;

        info!(account_id, template_id = %template.id, tag_count = tags.len(), "Message template created.");
        Ok(MessageTemplateDetail::new(template, tags))
    }

    pub async fn update(
        db: &DbConn,
        account_id: i32,
        template_id: Uuid,
        input: MessageTemplateInput,
    ) -> Result<MessageTemplateDetail, MessageTemplateError> {
        let txn = db.begin().await?;
        let existing = find_owned::<message_template::Entity, _>(&txn, account_id, template_id)
            .await?
            .ok_or(MessageTemplateError::NotFound(template_id))?;
        Self::check_body(&input.body)?;
        let tags = Self::resolve_tags(&txn, account_id, &input.tag_ids).await?;

        let mut active: message_template::ActiveModel = existing.into();
        active.kind = Set(input.kind);
        active.title = Set(input.title);
        active.body = Set(input.body);
        active.updated_at = Set(Utc::now());
        let template = active.update(&txn).await?;

        MessageTemplateTag::delete_many()
            .filter(message_template_tag::Column::MessageTemplateId.eq(template_id))
            .exec(&txn)
            .await?;
        Self::attach_tags(&txn, template_id, &tags).await?;
        txn.commit().await?;

        info!(account_id, template_id = %template_id, "Message template updated.");
        Ok(MessageTemplateDetail::new(template, tags))
    }

    pub async fn list_for(
        db: &DbConn,
        account_id: i32,
    ) -> Result<Vec<MessageTemplateDetail>, MessageTemplateError> {
        let templates = owned_by::<message_template::Entity>(account_id)
            .order_by_asc(message_template::Column::Title)
            .order_by_asc(message_template::Column::CreatedAt)
            .all(db)
            .await?;
        let tags = templates
            .load_many_to_many(tag::Entity, message_template_tag::Entity, db)
            .await?;

        Ok(templates
            .into_iter()
            .zip(tags)
            .map(|(template, tags)| MessageTemplateDetail::new(template, tags))
            .collect())
    }

    pub async fn get_for(
        db: &DbConn,
        account_id: i32,
        template_id: Uuid,
    ) -> Result<MessageTemplateDetail, MessageTemplateError> {
        let template = find_owned::<message_template::Entity, _>(db, account_id, template_id)
            .await?
            .ok_or(MessageTemplateError::NotFound(template_id))?;
        let tags = template
            .find_related(tag::Entity)
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?;
        Ok(MessageTemplateDetail::new(template, tags))
    }

    pub async fn delete(
        db: &DbConn,
        account_id: i32,
        template_id: Uuid,
    ) -> Result<(), MessageTemplateError> {
        let txn = db.begin().await?;
        let template = find_owned::<message_template::Entity, _>(&txn, account_id, template_id)
            .await?
            .ok_or(MessageTemplateError::NotFound(template_id))?;

        MessageTemplateTag::delete_many()
            .filter(message_template_tag::Column::MessageTemplateId.eq(template_id))
            .exec(&txn)
            .await?;
        template.delete(&txn).await?;
        txn.commit().await?;

        info!(account_id, template_id = %template_id, "Message template deleted.");
        Ok(())
    }

    fn check_body(body: &str) -> Result<(), MessageTemplateError> {
        template_params::parse_body(body).map(|_| ()).map_err(|e| {
            debug!(error = %e, "Rejected message template body.");
            MessageTemplateError::Invalid(FieldErrors::single(
                "body",
                format!("Template syntax error: {e}"),
            ))
        })
    }

    // Tags of another account are reported the same way as unknown ids.
    async fn resolve_tags<C: ConnectionTrait>(
        db: &C,
        account_id: i32,
        tag_ids: &[Uuid],
    ) -> Result<Vec<tag::Model>, MessageTemplateError> {
        let wanted: BTreeSet<Uuid> = tag_ids.iter().copied().collect();
        if wanted.is_empty() {
            return Ok(Vec::new());
        }

        let tags = owned_by::<tag::Entity>(account_id)
            .filter(tag::Column::Id.is_in(wanted.iter().copied()))
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?;

        let found: HashSet<Uuid> = tags.iter().map(|t| t.id).collect();
        if let Some(missing) = wanted.iter().find(|id| !found.contains(id)) {
            return Err(MessageTemplateError::Invalid(FieldErrors::single(
                "tags",
                format!("Select a valid choice. {missing} is not one of the available choices."),
            )));
        }
        Ok(tags)
    }

    async fn attach_tags<C: ConnectionTrait>(
        db: &C,
        template_id: Uuid,
        tags: &[tag::Model],
    ) -> Result<(), DbErr> {
        if tags.is_empty() {
            return Ok(());
        }
        let links = tags.iter().map(|t| message_template_tag::ActiveModel {
            message_template_id: Set(template_id),
            tag_id: Set(t.id),
        });
        MessageTemplateTag::insert_many(links)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }
}
