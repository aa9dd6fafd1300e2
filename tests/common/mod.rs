#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use reactimail::db::{
    self,
    entities::account,
    services::{AccountService, NewAccount},
};
use reactimail::server::config::ServerConfig;
use reactimail::services::clock::ManualClock;
use reactimail::web::{AppState, create_axum_router};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "testpassword123";
pub const DEFAULT_CLIENT: &str = "127.0.0.1:40000";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub clock: Arc<ManualClock>,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        // A single connection keeps every query on the same in-memory database.
        let db = db::connect("sqlite::memory:", 1).await.unwrap();
        db::ensure_schema(&db).await.unwrap();

        let mut config = ServerConfig::with_required("sqlite::memory:", "test-secret");
        config.password_hash_cost = 4;
        config.secure_cookies = false;
        adjust(&mut config);

        let clock = Arc::new(ManualClock::default());
        let state = Arc::new(AppState::new(db.clone(), Arc::new(config), clock.clone()));
        let router = create_axum_router(state.clone());

        TestApp {
            router,
            state,
            clock,
            db,
        }
    }

    pub async fn create_account(&self, email: &str) -> account::Model {
        AccountService::create_account(&self.db, NewAccount::new(email, PASSWORD), 4)
            .await
            .unwrap()
    }

    pub async fn send(&self, mut request: Request<Body>, client: &str) -> Response<Body> {
        let addr: SocketAddr = client.parse().unwrap();
        request.extensions_mut().insert(ConnectInfo(addr));
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn login_from(&self, client: &str, email: &str, password: &str) -> Response<Body> {
        let form = format!(
            "email={}&password={}",
            urlencoding::encode(email),
            urlencoding::encode(password)
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        self.send(request, client).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Response<Body> {
        self.login_from(DEFAULT_CLIENT, email, password).await
    }

    /// Logs in and returns the `session=...` cookie pair.
    pub async fn login_cookie(&self, email: &str) -> String {
        let response = self.login(email, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("login sets a session cookie")
    }

    /// Creates an account and logs it in.
    pub async fn signed_in(&self, email: &str) -> (account::Model, String) {
        let account = self.create_account(email).await;
        let cookie = self.login_cookie(email).await;
        (account, cookie)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap(), DEFAULT_CLIENT)
            .await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        cookie: &str,
        body: Value,
    ) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request, DEFAULT_CLIENT).await
    }

    pub async fn delete(&self, uri: &str, cookie: &str) -> Response<Body> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        self.send(request, DEFAULT_CLIENT).await
    }

    pub async fn create_tag(&self, cookie: &str, name: &str) -> Value {
        let response = self
            .json(
                Method::POST,
                "/api/tags",
                cookie,
                serde_json::json!({ "name": name }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with("session=") && pair.len() > "session=".len())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
