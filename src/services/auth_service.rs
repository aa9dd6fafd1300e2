use bcrypt::verify;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use once_cell::sync::Lazy;
use sea_orm::DbConn;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::entities::account;
use crate::db::services::AccountService;
use crate::validation::FieldErrors;
use crate::web::error::AppError;
use crate::web::models::SessionClaims;

/// Stand-in hashes for logins against unknown emails, one per bcrypt cost.
static DUMMY_HASHES: Lazy<DashMap<u32, String>> = Lazy::new(DashMap::new);

fn dummy_hash(cost: u32) -> Result<String, AppError> {
    if let Some(hash) = DUMMY_HASHES.get(&cost) {
        return Ok(hash.value().clone());
    }
    let hash = bcrypt::hash("no-such-account", cost)
        .map_err(|e| AppError::PasswordHashingError(format!("Failed to hash password: {e}")))?;
    Ok(DUMMY_HASHES.entry(cost).or_insert(hash).value().clone())
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))
}

/// Checks credentials. Unknown email, inactive account and wrong password
/// all fail the same way, and all of them pay for one bcrypt verification
/// at `hash_cost`.
pub async fn authenticate(
    db: &DbConn,
    email: &str,
    password: &str,
    hash_cost: u32,
) -> Result<account::Model, AppError> {
    let Some(account) = AccountService::find_by_email(db, email).await? else {
        verify_password(password, &dummy_hash(hash_cost)?)?;
        debug!("Login attempt for unknown email.");
        return Err(AppError::authentication_failed(FieldErrors::new()));
    };

    let valid_password = verify_password(password, &account.password_hash)?;
    if !account.is_active {
        debug!(account_id = account.id, "Login attempt for inactive account.");
        return Err(AppError::authentication_failed(FieldErrors::new()));
    }
    if !valid_password {
        debug!(account_id = account.id, "Login attempt with wrong password.");
        return Err(AppError::authentication_failed(FieldErrors::new()));
    }

    Ok(account)
}

pub fn create_session_token(
    account: &account::Model,
    session_id: Uuid,
    expires_at: DateTime<Utc>,
    secret: &str,
) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: account.email.clone(),
        account_id: account.id,
        sid: session_id,
        exp: expires_at.timestamp().max(0) as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(format!("Failed to sign session token: {e}")))
}

/// Verifies the token signature. Expiry is decided by the session store,
/// which slides it on every request, so `exp` is not enforced here.
pub fn decode_session_token(token: &str, secret: &str) -> Result<SessionClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            warn!(error = ?e, "Session token rejected.");
            AppError::Unauthorized("Invalid session token".to_string())
        })
}
