use axum::{
    body::Body as AxumBody,
    extract::{OriginalUri, State},
    http::{Request, Uri, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use tracing::debug;

use crate::db::services::{AccountError, AccountService};
use crate::services::auth_service;
use crate::web::models::AuthenticatedAccount;
use crate::web::{AppState, SESSION_COOKIE, error::AppError};

/// `/login?next=<path and query>`, keeping slashes readable.
pub fn login_redirect_target(uri: &Uri) -> String {
    let next = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    format!(
        "/login?next={}",
        urlencoding::encode(next).replace("%2F", "/")
    )
}

pub(crate) fn session_token(req: &Request<AxumBody>, jar: &CookieJar) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|s| s.to_string())
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
}

/// Lets the request through only with a live session for an active
/// account; anything else is sent to the login page.
///
/// Nested routers see a stripped `req.uri()`, so `next` is built from the
/// `OriginalUri`.
pub async fn auth(
    State(state): State<Arc<AppState>>,
    OriginalUri(original_uri): OriginalUri,
    jar: CookieJar,
    mut req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    let login_target = login_redirect_target(&original_uri);
    let to_login = || Redirect::to(&login_target).into_response();

    let Some(token) = session_token(&req, &jar) else {
        return Ok(to_login());
    };
    let Ok(claims) = auth_service::decode_session_token(&token, &state.config.session_secret)
    else {
        return Ok(to_login());
    };
    if state.sessions.touch(claims.sid, claims.account_id).is_none() {
        debug!(session_id = %claims.sid, "Session is missing or expired.");
        return Ok(to_login());
    }

    let account = match AccountService::get_by_id(&state.db_pool, claims.account_id).await {
        Ok(account) if account.is_active => account,
        Ok(_) | Err(AccountError::NotFound) => {
            state.sessions.end(claims.sid);
            return Ok(to_login());
        }
        Err(e) => return Err(e.into()),
    };

    req.extensions_mut()
        .insert(AuthenticatedAccount { id: account.id });
    Ok(next.run(req).await)
}
