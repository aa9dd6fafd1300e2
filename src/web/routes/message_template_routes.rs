use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use std::sync::Arc;
use tracing::debug;

use crate::db::{
    models::MessageTemplateDetail,
    services::{MessageTemplateError, MessageTemplateService},
};
use crate::web::models::{AuthenticatedAccount, MessageTemplateRequest};
use crate::web::routes::parse_id;
use crate::web::{AppError, AppState, forms};

impl From<MessageTemplateError> for AppError {
    fn from(err: MessageTemplateError) -> Self {
        match err {
            MessageTemplateError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            MessageTemplateError::NotFound(id) => {
                debug!(template_id = %id, "Message template not found for account.");
                AppError::NotFound("Message template not found".to_string())
            }
            MessageTemplateError::Invalid(errors) => AppError::Validation(errors),
        }
    }
}

async fn list_message_templates_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<MessageTemplateDetail>>, AppError> {
    let templates =
        MessageTemplateService::list_for(&app_state.db_pool, authenticated_account.id).await?;
    Ok(Json(templates))
}

async fn create_message_template_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<MessageTemplateRequest>,
) -> Result<(StatusCode, Json<MessageTemplateDetail>), AppError> {
    let input = forms::clean_message_template(&payload).map_err(AppError::Validation)?;
    let template =
        MessageTemplateService::create(&app_state.db_pool, authenticated_account.id, input)
            .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

async fn get_message_template_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
) -> Result<Json<MessageTemplateDetail>, AppError> {
    let template_id = parse_id(&template_id, "Message template")?;
    let template =
        MessageTemplateService::get_for(&app_state.db_pool, authenticated_account.id, template_id)
            .await?;
    Ok(Json(template))
}

async fn update_message_template_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
    Json(payload): Json<MessageTemplateRequest>,
) -> Result<Json<MessageTemplateDetail>, AppError> {
    let template_id = parse_id(&template_id, "Message template")?;
    MessageTemplateService::get_for(&app_state.db_pool, authenticated_account.id, template_id)
        .await?;
    let input = forms::clean_message_template(&payload).map_err(AppError::Validation)?;
    let template = MessageTemplateService::update(
        &app_state.db_pool,
        authenticated_account.id,
        template_id,
        input,
    )
    .await?;
    Ok(Json(template))
}

async fn delete_message_template_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let template_id = parse_id(&template_id, "Message template")?;
    MessageTemplateService::delete(&app_state.db_pool, authenticated_account.id, template_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_message_templates_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(list_message_templates_handler).post(create_message_template_handler),
        )
        .route(
            "/{id}",
            get(get_message_template_handler)
                .put(update_message_template_handler)
                .delete(delete_message_template_handler),
        )
}
