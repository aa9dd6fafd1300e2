use axum::{
    body::Body as AxumBody,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Method, Request},
    middleware::Next,
    response::Response,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::services::rate_limit::GateState;
use crate::web::{AppState, error::AppError};

/// Identifies the client for rate limiting. Proxy headers are only read
/// when the deployment says they can be trusted.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    if trust_forwarded {
        // First entry is the original client.
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }

        let real_ip = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok());
        if let Some(ip) = real_ip {
            return ip.to_string();
        }
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => "unknown".to_string(),
    }
}

/// Counts every login submission and turns away clients over the limit
/// before credentials are looked at.
pub async fn login_rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request<AxumBody>,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() != Method::POST {
        return Ok(next.run(req).await);
    }

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client = client_identity(req.headers(), peer, state.config.trust_forwarded_headers);

    match state.login_limiter.register_attempt(&client).await {
        GateState::Locked => Err(AppError::RateLimited),
        GateState::Open { .. } => Ok(next.run(req).await),
    }
}
