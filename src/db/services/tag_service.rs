use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::db::entities::{message_template_tag, prelude::MessageTemplateTag, tag};
use crate::db::scope::{find_owned, owned_by};
use crate::db::services::is_unique_violation;

#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Tag not found: {0}")]
    NotFound(Uuid),
    #[error("A tag with the name '{0}' already exists.")]
    DuplicateName(String),
}

fn duplicate_or_db(err: DbErr, name: &str) -> TagError {
    if is_unique_violation(&err) {
        TagError::DuplicateName(name.to_string())
    } else {
        TagError::DbErr(err)
    }
}

pub struct TagService;

impl TagService {
    pub async fn create(db: &DbConn, account_id: i32, name: String) -> Result<tag::Model, TagError> {
        if Self::name_taken(db, account_id, &name, None).await? {
            debug!(account_id, name = %name, "Rejected duplicate tag name.");
            return Err(TagError::DuplicateName(name));
        }

        Self::insert_tag(db, account_id, name).await
    }

    /// Renames a tag. Keeping the current name is not a collision.
    pub async fn rename(
        db: &DbConn,
        account_id: i32,
        tag_id: Uuid,
        new_name: String,
    ) -> Result<tag::Model, TagError> {
        let tag = Self::get_for(db, account_id, tag_id).await?;
        if Self::name_taken(db, account_id, &new_name, Some(tag_id)).await? {
            debug!(account_id, name = %new_name, "Rejected duplicate tag name.");
            return Err(TagError::DuplicateName(new_name));
        }

        Self::apply_rename(db, tag, new_name).await
    }

    pub async fn list_for(db: &DbConn, account_id: i32) -> Result<Vec<tag::Model>, TagError> {
        Ok(owned_by::<tag::Entity>(account_id)
            .order_by_asc(tag::Column::Name)
            .all(db)
            .await?)
    }

    pub async fn get_for(db: &DbConn, account_id: i32, tag_id: Uuid) -> Result<tag::Model, TagError> {
        find_owned::<tag::Entity, _>(db, account_id, tag_id)
            .await?
            .ok_or(TagError::NotFound(tag_id))
    }

    /// Deletes a tag and detaches it from every template; the templates
    /// themselves are kept.
    pub async fn delete(db: &DbConn, account_id: i32, tag_id: Uuid) -> Result<(), TagError> {
        let txn = db.begin().await?;
        let tag = find_owned::<tag::Entity, _>(&txn, account_id, tag_id)
            .await?
            .ok_or(TagError::NotFound(tag_id))?;

        MessageTemplateTag::delete_many()
            .filter(message_template_tag::Column::TagId.eq(tag.id))
            .exec(&txn)
            .await?;
        tag.delete(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    // The unique index still catches a concurrent write of the same name
    // between `name_taken` and these two.
    async fn insert_tag(db: &DbConn, account_id: i32, name: String) -> Result<tag::Model, TagError> {
        let now = Utc::now();
        let new_tag = tag::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account_id),
            name: Set(name.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        new_tag
            .insert(db)
            .await
            .map_err(|e| duplicate_or_db(e, &name))
    }

    async fn apply_rename(
        db: &DbConn,
        tag: tag::Model,
        new_name: String,
    ) -> Result<tag::Model, TagError> {
        let mut active_tag: tag::ActiveModel = tag.into();
        active_tag.name = Set(new_name.clone());
        active_tag.updated_at = Set(Utc::now());
        active_tag
            .update(db)
            .await
            .map_err(|e| duplicate_or_db(e, &new_name))
    }

    async fn name_taken<C: ConnectionTrait>(
        db: &C,
        account_id: i32,
        name: &str,
        except: Option<Uuid>,
    ) -> Result<bool, DbErr> {
        let mut query = owned_by::<tag::Entity>(account_id).filter(tag::Column::Name.eq(name));
        if let Some(tag_id) = except {
            query = query.filter(tag::Column::Id.ne(tag_id));
        }
        Ok(query.one(db).await?.is_some())
    }
}
