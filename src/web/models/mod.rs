use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginPage {
    pub fields: Vec<String>,
    pub next: Option<String>,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // account email
    pub account_id: i32,
    pub sid: Uuid,
    pub exp: usize,
}

/// Account details attached to a request once its session checks out.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    pub id: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeResponse {
    pub email: String,
    pub nickname: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TagRequest {
    #[serde(default)]
    pub name: String,
}

/// Tag ids arrive as strings so that a malformed id is reported against
/// the `tags` field instead of failing the whole body.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MessageTemplateRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NicknameRequest {
    #[serde(default)]
    pub nickname: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PasswordChangeRequest {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
}
