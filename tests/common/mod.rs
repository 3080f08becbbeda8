//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - In-memory database fixtures
//! - User and token helpers
//! - An HTTP driver for the router

#![allow(dead_code)]

pub mod assertions;
pub mod auth_helpers;
pub mod database;

// Re-export commonly used utilities
pub use auth_helpers::*;
pub use database::*;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::Router;
use securechat::backend::auth::sessions::verify_token;
use securechat::backend::realtime::SessionId;
use securechat::backend::routes::create_router;
use securechat::backend::server::{AppState, ServerConfig};
use securechat::shared::ServerEvent;
use serde_json::Value;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Router and state over `pool` with default configuration
pub fn test_app(pool: &SqlitePool) -> (Router, AppState) {
    let state = AppState::new(pool.clone(), ServerConfig::default());
    (create_router(state.clone()), state)
}

/// Send one request through the router and decode the JSON envelope
///
/// Every route answers 200; the semantic code is in the body.
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Value {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, auth_header(token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a live session for `user`, authenticated with their token
///
/// Mirrors what the socket handler does after a successful `auth` frame.
pub async fn open_session(
    state: &AppState,
    user: &TestUser,
) -> (SessionId, mpsc::Receiver<ServerEvent>) {
    let claims = verify_token(&state.config.auth, &user.token).unwrap();
    let session = SessionId::new();
    let outbox = state.hub.register(session);
    state.presence.connect(session).await;
    state
        .presence
        .authenticate_with(session, user.id(), Some(claims.jti))
        .await;
    (session, outbox)
}
