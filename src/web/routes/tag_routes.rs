use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;
use tracing::debug;

use crate::db::{
    models::Tag as DtoTag,
    services::{TagError, TagService},
};
use crate::validation::FieldErrors;
use crate::web::models::{AuthenticatedAccount, TagRequest};
use crate::web::routes::parse_id;
use crate::web::{AppError, AppState, forms};

impl From<TagError> for AppError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            TagError::NotFound(id) => {
                debug!(tag_id = %id, "Tag not found for account.");
                AppError::NotFound("Tag not found".to_string())
            }
            TagError::DuplicateName(_) => {
                AppError::Conflict(FieldErrors::single("name", err.to_string()))
            }
        }
    }
}

async fn list_tags_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<DtoTag>>, AppError> {
    let tags = TagService::list_for(&app_state.db_pool, authenticated_account.id).await?;
    Ok(Json(tags.into_iter().map(DtoTag::from).collect()))
}

async fn create_tag_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<TagRequest>,
) -> Result<(StatusCode, Json<DtoTag>), AppError> {
    let name = forms::clean_tag(&payload).map_err(AppError::Validation)?;
    let tag = TagService::create(&app_state.db_pool, authenticated_account.id, name).await?;
    Ok((StatusCode::CREATED, Json(tag.into())))
}

async fn get_tag_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
) -> Result<Json<DtoTag>, AppError> {
    let tag_id = parse_id(&tag_id, "Tag")?;
    let tag = TagService::get_for(&app_state.db_pool, authenticated_account.id, tag_id).await?;
    Ok(Json(tag.into()))
}

async fn update_tag_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
    Json(payload): Json<TagRequest>,
) -> Result<Json<DtoTag>, AppError> {
    let tag_id = parse_id(&tag_id, "Tag")?;
    // Someone else's tag is a 404 even when the body is invalid.
    TagService::get_for(&app_state.db_pool, authenticated_account.id, tag_id).await?;
    let name = forms::clean_tag(&payload).map_err(AppError::Validation)?;
    let tag =
        TagService::rename(&app_state.db_pool, authenticated_account.id, tag_id, name).await?;
    Ok(Json(tag.into()))
}

async fn delete_tag_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Path(tag_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let tag_id = parse_id(&tag_id, "Tag")?;
    TagService::delete(&app_state.db_pool, authenticated_account.id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_tags_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tags_handler).post(create_tag_handler))
        .route(
            "/{id}",
            get(get_tag_handler)
                .put(update_tag_handler)
                .delete(delete_tag_handler),
        )
}
