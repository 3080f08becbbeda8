//! Authentication and user API integration tests
//!
//! Drives the router with `oneshot` and checks the response envelope,
//! token handling and the account endpoints.

use axum::http::Method;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::*;
use crate::{assert_envelope_err, assert_envelope_ok};

#[tokio::test]
async fn test_unknown_route_is_enveloped_not_found() {
    let pool = create_test_pool().await;
    let (app, _) = test_app(&pool);

    let body = call(&app, Method::GET, "/api/v1/nothing-here", None, None).await;
    assert_envelope_err!(body, 404);
}

#[tokio::test]
async fn test_protected_routes_require_a_valid_token() {
    let pool = create_test_pool().await;
    let (app, _) = test_app(&pool);

    let body = call(&app, Method::GET, "/api/v1/chats", None, None).await;
    assert_envelope_err!(body, 401);

    let body = call(&app, Method::GET, "/api/v1/users/profile", Some("garbage"), None).await;
    assert_envelope_err!(body, 401);
}

#[tokio::test]
async fn test_signup_login_refresh_logout() {
    let pool = create_test_pool().await;
    let (app, _) = test_app(&pool);

    let body = call(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({
            "username": "alice",
            "password": "secret123",
            "display_name": "Alice",
            "pub_key": "alice-public-key"
        })),
    )
    .await;
    let user = assert_envelope_ok!(body);
    assert_eq!(user["username"], "alice");
    assert!(user.get("password_hash").is_none());

    let body = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;
    assert_envelope_err!(body, 401);

    let body = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "secret123" })),
    )
    .await;
    let tokens = assert_envelope_ok!(body);
    let access = tokens["access_token"].as_str().unwrap().to_string();
    let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&access), None).await;
    let profile = assert_envelope_ok!(body);
    assert_eq!(profile["display_name"], "Alice");
    assert_eq!(profile["unseen_total"], 0);

    // A refresh token is not an access token
    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&refresh), None).await;
    assert_envelope_err!(body, 401);

    let body = call(&app, Method::POST, "/api/v1/auth/refresh", Some(&refresh), None).await;
    let refreshed = assert_envelope_ok!(body);
    let new_access = refreshed["access_token"].as_str().unwrap().to_string();

    let body = call(&app, Method::DELETE, "/api/v1/auth/logout", Some(&access), None).await;
    assert_envelope_ok!(body);
    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&access), None).await;
    assert_envelope_err!(body, 401);

    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&new_access), None).await;
    assert_envelope_ok!(body);
}

#[tokio::test]
async fn test_signup_rejects_taken_username_and_spaced_password() {
    let pool = create_test_pool().await;
    let (app, _) = test_app(&pool);
    create_plain_user(&pool, "alice", false).await;

    let body = call(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({
            "username": "alice",
            "password": "secret123",
            "display_name": "Alice",
            "pub_key": "k"
        })),
    )
    .await;
    assert_envelope_err!(body, 400);
    assert_eq!(body["message"], "The username has existed");

    let body = call(
        &app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({
            "username": "bob",
            "password": "has space",
            "display_name": "Bob",
            "pub_key": "k"
        })),
    )
    .await;
    assert_envelope_err!(body, 400);
}

#[tokio::test]
async fn test_admin_deactivation_revokes_access() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let admin = create_test_admin(&pool, "root").await;
    let (app, _) = test_app(&pool);

    let uri = format!("/api/v1/users/{}", bob.id());
    let body = call(&app, Method::DELETE, &uri, Some(&alice.token), None).await;
    assert_envelope_err!(body, 403);

    let body = call(&app, Method::DELETE, &uri, Some(&admin.token), None).await;
    assert_envelope_ok!(body);

    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&bob.token), None).await;
    assert_envelope_err!(body, 401);

    // History with a deactivated user stays readable
    let body = call(&app, Method::GET, &uri, Some(&alice.token), None).await;
    assert_eq!(assert_envelope_ok!(body)["username"], "bob");
}

#[tokio::test]
async fn test_user_online_lookup() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let bob = create_test_user(&pool, "bob").await;
    let (app, state) = test_app(&pool);
    let uri = format!("/api/v1/users/{}/online", bob.id());

    let body = call(&app, Method::GET, &uri, Some(&alice.token), None).await;
    assert_eq!(assert_envelope_ok!(body)["online"], false);

    let session = securechat::backend::realtime::SessionId::new();
    state.presence.connect(session).await;
    state.presence.authenticate(session, bob.id()).await;

    let body = call(&app, Method::GET, &uri, Some(&alice.token), None).await;
    assert_eq!(assert_envelope_ok!(body)["online"], true);
}

async fn signup_and_login(app: &axum::Router, username: &str, password: &str) -> String {
    let body = call(
        app,
        Method::POST,
        "/api/v1/users",
        None,
        Some(json!({
            "username": username,
            "password": password,
            "display_name": username,
            "pub_key": "original-key"
        })),
    )
    .await;
    assert_envelope_ok!(body);
    login(app, username, password).await
}

async fn login(app: &axum::Router, username: &str, password: &str) -> String {
    let body = call(
        app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_envelope_ok!(body)["access_token"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_update_profile_rotates_key() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let (app, _) = test_app(&pool);

    let body = call(
        &app,
        Method::PUT,
        "/api/v1/users/profile",
        Some(&alice.token),
        Some(json!({ "pub_key": "rotated-key" })),
    )
    .await;
    let user = assert_envelope_ok!(body);
    assert_eq!(user["pub_key"], "rotated-key");
    assert_eq!(user["display_name"], "alice");

    let body = call(
        &app,
        Method::PUT,
        "/api/v1/users/profile",
        Some(&alice.token),
        Some(json!({ "display_name": "Alice Liddell" })),
    )
    .await;
    assert_eq!(assert_envelope_ok!(body)["display_name"], "Alice Liddell");

    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&alice.token), None).await;
    let profile = assert_envelope_ok!(body);
    assert_eq!(profile["pub_key"], "rotated-key");
    assert_eq!(profile["display_name"], "Alice Liddell");

    let body = call(
        &app,
        Method::PUT,
        "/api/v1/users/profile",
        Some(&alice.token),
        Some(json!({})),
    )
    .await;
    assert_envelope_err!(body, 400);
}

#[tokio::test]
async fn test_change_password_keeps_only_current_token() {
    let pool = create_test_pool().await;
    let (app, _) = test_app(&pool);
    let current = signup_and_login(&app, "alice", "secret123").await;
    let other = login(&app, "alice", "secret123").await;

    let body = call(
        &app,
        Method::PUT,
        "/api/v1/users/change_password",
        Some(&current),
        Some(json!({ "current_password": "wrong-one", "new_password": "newsecret" })),
    )
    .await;
    assert_envelope_err!(body, 401);

    let body = call(
        &app,
        Method::PUT,
        "/api/v1/users/change_password",
        Some(&current),
        Some(json!({ "current_password": "secret123", "new_password": "new secret" })),
    )
    .await;
    assert_envelope_err!(body, 400);

    let body = call(
        &app,
        Method::PUT,
        "/api/v1/users/change_password",
        Some(&current),
        Some(json!({ "current_password": "secret123", "new_password": "newsecret" })),
    )
    .await;
    assert_envelope_ok!(body);

    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&current), None).await;
    assert_envelope_ok!(body);
    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&other), None).await;
    assert_envelope_err!(body, 401);

    let body = call(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "secret123" })),
    )
    .await;
    assert_envelope_err!(body, 401);
    login(&app, "alice", "newsecret").await;
}

#[tokio::test]
async fn test_admin_edits_and_resets_users() {
    let pool = create_test_pool().await;
    let admin = create_test_admin(&pool, "root").await;
    let alice = create_test_user(&pool, "alice").await;
    let (app, state) = test_app(&pool);
    let (_session, mut outbox) = open_session(&state, &alice).await;
    let uri = format!("/api/v1/users/{}", alice.id());

    let body = call(
        &app,
        Method::PUT,
        &uri,
        Some(&alice.token),
        Some(json!({ "is_admin": true })),
    )
    .await;
    assert_envelope_err!(body, 403);

    let body = call(
        &app,
        Method::PUT,
        &uri,
        Some(&admin.token),
        Some(json!({ "display_name": "Alice", "is_admin": true })),
    )
    .await;
    let user = assert_envelope_ok!(body);
    assert_eq!(user["display_name"], "Alice");
    assert_eq!(user["is_admin"], true);

    let body = call(
        &app,
        Method::PUT,
        &format!("/api/v1/users/{}", uuid::Uuid::new_v4()),
        Some(&admin.token),
        Some(json!({ "display_name": "Nobody" })),
    )
    .await;
    assert_envelope_err!(body, 404);

    let reset_uri = format!("{uri}/reset_password");
    let body = call(
        &app,
        Method::PUT,
        &reset_uri,
        Some(&admin.token),
        Some(json!({ "new_password": "fresh-pass" })),
    )
    .await;
    assert_envelope_ok!(body);

    let body = call(&app, Method::GET, "/api/v1/users/profile", Some(&alice.token), None).await;
    assert_envelope_err!(body, 401);
    assert!(outbox.recv().await.is_none());
    assert!(!state.presence.is_online(alice.id()).await);
    login(&app, "alice", "fresh-pass").await;
}

#[tokio::test]
async fn test_logout_closes_sessions_of_that_token() {
    let pool = create_test_pool().await;
    let alice = create_test_user(&pool, "alice").await;
    let alice_phone = another_token(&pool, &alice).await;
    let (app, state) = test_app(&pool);
    let (_desktop, mut desktop_outbox) = open_session(&state, &alice).await;
    let (phone, _phone_outbox) = open_session(&state, &alice_phone).await;

    let body = call(&app, Method::DELETE, "/api/v1/auth/logout", Some(&alice.token), None).await;
    assert_envelope_ok!(body);

    assert!(desktop_outbox.recv().await.is_none());
    assert_eq!(
        state.presence.sessions_for(alice.id()).await.into_iter().collect::<Vec<_>>(),
        vec![phone]
    );
}

#[tokio::test]
async fn test_deactivation_closes_live_sessions() {
    let pool = create_test_pool().await;
    let bob = create_test_user(&pool, "bob").await;
    let carol = create_test_user(&pool, "carol").await;
    let admin = create_test_admin(&pool, "root").await;
    let (app, state) = test_app(&pool);
    let (_session, mut bob_outbox) = open_session(&state, &bob).await;
    let (_watcher, mut carol_outbox) = open_session(&state, &carol).await;

    let uri = format!("/api/v1/users/{}", bob.id());
    let body = call(&app, Method::DELETE, &uri, Some(&admin.token), None).await;
    assert_envelope_ok!(body);

    assert!(bob_outbox.recv().await.is_none());
    assert!(!state.presence.is_online(bob.id()).await);
    assert_eq!(
        carol_outbox.recv().await,
        Some(securechat::shared::ServerEvent::Offline { user_id: bob.id() })
    );
}
