use axum::{
    Extension, Form, Json, Router,
    extract::{Query, State},
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::db::services::AccountService;
use crate::services::auth_service;
use crate::web::forms::clean_login;
use crate::web::models::{AuthenticatedAccount, HomeResponse, LoginForm, LoginPage, LoginQuery};
use crate::web::{AppError, AppState, SESSION_COOKIE};

async fn login_page_handler(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        fields: vec!["email".to_string(), "password".to_string()],
        next: query.next,
    })
}

fn previous_session(jar: &CookieJar, secret: &str) -> Option<Uuid> {
    let token = jar.get(SESSION_COOKIE)?;
    auth_service::decode_session_token(token.value(), secret)
        .ok()
        .map(|claims| claims.sid)
}

async fn login_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    let (email, password) = clean_login(&form).map_err(|errors| {
        info!("Login rejected: incomplete form.");
        AppError::authentication_failed(errors)
    })?;

    let account = auth_service::authenticate(
        &app_state.db_pool,
        &email,
        &password,
        app_state.config.password_hash_cost,
    )
    .await
    .inspect_err(|_| info!("Login rejected: bad credentials."))?;

    let secret = &app_state.config.session_secret;
    let (session_id, session) = app_state
        .sessions
        .rotate(previous_session(&jar, secret), account.id);
    let token =
        auth_service::create_session_token(&account, session_id, session.expires_at, secret)?;

    let session_cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(app_state.config.secure_cookies)
        .build();

    info!(account_id = account.id, "Login succeeded.");
    Ok((jar.add(session_cookie), Redirect::to("/")))
}

async fn logout_handler(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(session_id) = previous_session(&jar, &app_state.config.session_secret) {
        app_state.sessions.end(session_id);
        info!(session_id = %session_id, "Logged out.");
    }
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login"))
}

async fn home_handler(
    Extension(authenticated_account): Extension<AuthenticatedAccount>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<HomeResponse>, AppError> {
    let account = AccountService::get_by_id(&app_state.db_pool, authenticated_account.id).await?;
    Ok(Json(HomeResponse {
        email: account.email,
        nickname: account.nickname,
    }))
}

pub fn create_login_router() -> Router<Arc<AppState>> {
    Router::new().route("/login", get(login_page_handler).post(login_handler))
}

pub fn create_logout_router() -> Router<Arc<AppState>> {
    Router::new().route("/logout", post(logout_handler))
}

pub fn create_home_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(home_handler))
}
