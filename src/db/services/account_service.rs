use bcrypt::hash;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, Set};
use tracing::info;

use crate::db::entities::{account, prelude::Account};
use crate::db::services::is_unique_violation;
use crate::services::nickname::generate_random_nickname;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_NICKNAME_LENGTH: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),
    #[error("Account not found")]
    NotFound,
    #[error("Enter a valid email address.")]
    InvalidEmail,
    #[error("An account with this email already exists.")]
    EmailTaken,
    #[error("Password must be at least 8 characters long.")]
    PasswordTooShort,
    #[error("Nickname must be between 1 and 200 characters.")]
    InvalidNickname,
    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub nickname: Option<String>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewAccount {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        NewAccount {
            email: email.into(),
            password: password.into(),
            nickname: None,
            is_staff: false,
            is_superuser: false,
        }
    }

    pub fn superuser(email: impl Into<String>, password: impl Into<String>) -> Self {
        NewAccount {
            is_staff: true,
            is_superuser: true,
            ..NewAccount::new(email, password)
        }
    }
}

/// Trims the address and lower-cases its domain part. The local part is
/// kept as entered.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}

fn hash_password(password: &str, cost: u32) -> Result<String, AccountError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::PasswordTooShort);
    }
    hash(password, cost).map_err(|e| AccountError::PasswordHashing(e.to_string()))
}

fn check_nickname(nickname: &str) -> Result<(), AccountError> {
    let length = nickname.trim().chars().count();
    if length == 0 || length > MAX_NICKNAME_LENGTH {
        return Err(AccountError::InvalidNickname);
    }
    Ok(())
}

pub struct AccountService;

impl AccountService {
    pub async fn create_account(
        db: &DbConn,
        new_account: NewAccount,
        hash_cost: u32,
    ) -> Result<account::Model, AccountError> {
        let email = normalize_email(&new_account.email);
        if !email_address::EmailAddress::is_valid(&email) {
            return Err(AccountError::InvalidEmail);
        }
        if Self::find_by_email(db, &email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }
        let nickname = match new_account.nickname {
            Some(nickname) => {
                check_nickname(&nickname)?;
                nickname.trim().to_string()
            }
            None => generate_random_nickname(),
        };
        let password_hash = hash_password(&new_account.password, hash_cost)?;

        let now = Utc::now();
        let new_model = account::ActiveModel {
            email: Set(email),
            password_hash: Set(password_hash),
            nickname: Set(nickname),
            is_active: Set(true),
            // Superusers are always staff.
            is_staff: Set(new_account.is_staff || new_account.is_superuser),
            is_superuser: Set(new_account.is_superuser),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = new_model.insert(db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AccountError::EmailTaken
            } else {
                AccountError::DbErr(e)
            }
        })?;
        info!(account_id = created.id, is_staff = created.is_staff, "Account created.");
        Ok(created)
    }

    pub async fn find_by_email(db: &DbConn, email: &str) -> Result<Option<account::Model>, DbErr> {
        Account::find()
            .filter(account::Column::Email.eq(normalize_email(email)))
            .one(db)
            .await
    }

    pub async fn get_by_id(db: &DbConn, account_id: i32) -> Result<account::Model, AccountError> {
        Account::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or(AccountError::NotFound)
    }

    pub async fn update_nickname(
        db: &DbConn,
        account_id: i32,
        nickname: &str,
    ) -> Result<account::Model, AccountError> {
        check_nickname(nickname)?;
        let mut active: account::ActiveModel = Self::get_by_id(db, account_id).await?.into();
        active.nickname = Set(nickname.trim().to_string());
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    pub async fn set_password(
        db: &DbConn,
        account_id: i32,
        new_password: &str,
        hash_cost: u32,
    ) -> Result<account::Model, AccountError> {
        let password_hash = hash_password(new_password, hash_cost)?;
        let mut active: account::ActiveModel = Self::get_by_id(db, account_id).await?.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }

    pub async fn set_active(
        db: &DbConn,
        account_id: i32,
        is_active: bool,
    ) -> Result<account::Model, AccountError> {
        let mut active: account::ActiveModel = Self::get_by_id(db, account_id).await?.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Utc::now());
        Ok(active.update(db).await?)
    }
}
