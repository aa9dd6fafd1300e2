pub mod account_routes;
pub mod auth_routes;
pub mod message_template_routes;
pub mod tag_routes;

use uuid::Uuid;

use crate::web::error::AppError;

/// Path ids that are not UUIDs cannot name any record.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{what} not found")))
}
