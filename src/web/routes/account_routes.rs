use axum::{
    Extension, Json, Router,
    extract::State,
    routing::{get, put},
};
use bcrypt::verify;
use std::sync::Arc;
use tracing::info;

use crate::db::models::AccountProfile;
use crate::db::services::{AccountError, AccountService};
use crate::validation::FieldErrors;
use crate::web::models::{AuthenticatedAccount, NicknameRequest, PasswordChangeRequest};
use crate::web::{AppError, AppState};

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DbErr(e) => AppError::DatabaseError(e.to_string()),
            AccountError::NotFound => AppError::NotFound("Account not found".to_string()),
            AccountError::InvalidEmail => {
                AppError::Validation(FieldErrors::single("email", err.to_string()))
            }
            AccountError::EmailTaken => {
                AppError::Conflict(FieldErrors::single("email", err.to_string()))
            }
            AccountError::PasswordTooShort => {
                AppError::Validation(FieldErrors::single("password", err.to_string()))
            }
            AccountError::InvalidNickname => {
                AppError::Validation(FieldErrors::single("nickname", err.to_string()))
            }
            AccountError::PasswordHashing(msg) => AppError::PasswordHashingError(msg),
        }
    }
}

async fn get_account_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<AccountProfile>, AppError> {
    let account = AccountService::get_by_id(&app_state.db_pool, authenticated_account.id).await?;
    Ok(Json(account.into()))
}

async fn update_nickname_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<NicknameRequest>,
) -> Result<Json<AccountProfile>, AppError> {
    let account = AccountService::update_nickname(
        &app_state.db_pool,
        authenticated_account.id,
        &payload.nickname,
    )
    .await?;
    Ok(Json(account.into()))
}

async fn change_password_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<Json<AccountProfile>, AppError> {
    let account = AccountService::get_by_id(&app_state.db_pool, authenticated_account.id).await?;

    let matches = verify(&payload.current_password, &account.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;
    if !matches {
        return Err(AppError::Validation(FieldErrors::single(
            "current_password",
            "Your old password was entered incorrectly. Please enter it again.",
        )));
    }

    let account = AccountService::set_password(
        &app_state.db_pool,
        account.id,
        &payload.new_password,
        app_state.config.password_hash_cost,
    )
    .await
    .map_err(|e| match e {
        AccountError::PasswordTooShort => {
            AppError::Validation(FieldErrors::single("new_password", e.to_string()))
        }
        other => other.into(),
    })?;

    info!(account_id = account.id, "Password changed.");
    Ok(Json(account.into()))
}

pub fn create_account_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_account_handler))
        .route("/nickname", put(update_nickname_handler))
        .route("/password", put(change_password_handler))
}
