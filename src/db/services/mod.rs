//! Data access for accounts, tags and message templates.
//!
//! Tag and template services only reach their rows through `db::scope`, so
//! every query is limited to the calling account.

pub mod account_service;
pub mod message_template_service;
pub mod tag_service;

pub use account_service::*;
pub use message_template_service::*;
pub use tag_service::*;

use sea_orm::{DbErr, SqlErr};

/// Whether `err` is the database rejecting a duplicate key.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
