use axum::{Router, middleware as axum_middleware, routing::get};
use chrono::Duration;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::server::config::ServerConfig;
use crate::services::clock::Clock;
use crate::services::rate_limit::{InMemoryCounterStore, LoginRateLimiter};
use crate::services::session_store::SessionStore;
use crate::web::{
    middleware::{auth, rate_limit},
    routes::*,
};

pub use crate::web::error::AppError;

pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "session";

pub struct AppState {
    pub db_pool: DatabaseConnection,
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<SessionStore>,
    pub login_counters: Arc<InMemoryCounterStore>,
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    pub fn new(db_pool: DatabaseConnection, config: Arc<ServerConfig>, clock: Arc<dyn Clock>) -> Self {
        let sessions = Arc::new(SessionStore::new(
            Duration::seconds(config.session_expire_seconds),
            clock.clone(),
        ));
        let login_counters = Arc::new(InMemoryCounterStore::new(clock));
        let login_limiter = Arc::new(LoginRateLimiter::new(
            login_counters.clone(),
            config.login_max_attempts,
            Duration::seconds(config.login_window_seconds),
        ));

        AppState {
            db_pool,
            config,
            sessions,
            login_counters,
            login_limiter,
        }
    }

    /// Drops finished rate-limit windows and expired sessions.
    pub fn purge_expired(&self) {
        self.login_counters.purge_expired();
        self.sessions.purge_expired();
    }
}

async fn health_check_handler() -> &'static str {
    "OK"
}

pub fn create_axum_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health_check_handler))
        .merge(
            auth_routes::create_login_router().route_layer(axum_middleware::from_fn_with_state(
                app_state.clone(),
                rate_limit::login_rate_limit,
            )),
        )
        .merge(auth_routes::create_logout_router())
        .merge(
            auth_routes::create_home_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/account",
            account_routes::create_account_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/tags",
            tag_routes::create_tags_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .nest(
            "/api/message-templates",
            message_template_routes::create_message_templates_router()
                .route_layer(axum_middleware::from_fn_with_state(app_state.clone(), auth::auth)),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
