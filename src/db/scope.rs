//! Account scoping for owned records.
//!
//! Every lookup of a tag or message template goes through [`owned_by`] or
//! [`find_owned`]; a record that belongs to another account is
//! indistinguishable from one that does not exist.

use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Select};
use uuid::Uuid;

use crate::db::entities::{message_template, tag};

pub trait AccountOwned: EntityTrait {
    fn owner_column() -> Self::Column;
    fn id_column() -> Self::Column;
}

impl AccountOwned for tag::Entity {
    fn owner_column() -> Self::Column {
        tag::Column::AccountId
    }
    fn id_column() -> Self::Column {
        tag::Column::Id
    }
}

impl AccountOwned for message_template::Entity {
    fn owner_column() -> Self::Column {
        message_template::Column::AccountId
    }
    fn id_column() -> Self::Column {
        message_template::Column::Id
    }
}

/// All records of `E` visible to `account_id`.
pub fn owned_by<E: AccountOwned>(account_id: i32) -> Select<E> {
    E::find().filter(E::owner_column().eq(account_id))
}

/// The record `id` if it belongs to `account_id`.
pub async fn find_owned<E, C>(db: &C, account_id: i32, id: Uuid) -> Result<Option<E::Model>, DbErr>
where
    E: AccountOwned,
    C: ConnectionTrait,
{
    owned_by::<E>(account_id)
        .filter(E::id_column().eq(id))
        .one(db)
        .await
}
